pub mod app;
pub mod gallery_grid;
pub mod stitch_viewer;
pub mod viewer_controls;
