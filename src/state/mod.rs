pub mod gesture;
pub mod lightbox;
pub mod viewer;
pub mod viewport;

pub use gesture::{SurfaceFrame, TouchPoint};
pub use viewer::ViewerCore;
pub use viewport::{DeviceSurface, Viewport};
