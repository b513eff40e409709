// Browser-free core of the stitch viewer: engine + gesture router + surface.

use crate::config::{ResizePolicy, ViewerConfig};
use crate::state::gesture::{GestureCommand, GestureRouter, SurfaceFrame, TouchPoint};
use crate::state::viewport::{DeviceSurface, TransformEngine, Viewport};

#[derive(Debug, Clone)]
pub struct ViewerCore {
    engine: TransformEngine,
    router: GestureRouter,
    surface: DeviceSurface,
    /// Combined width/height of the loaded pair; `None` until both images decode.
    content: Option<(f64, f64)>,
    resize_policy: ResizePolicy,
    button_zoom_in: f64,
    button_zoom_out: f64,
}

impl ViewerCore {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            engine: TransformEngine::new(config.min_scale, config.max_scale, config.fit_margin),
            router: GestureRouter::new(config.wheel_zoom_in, config.wheel_zoom_out),
            surface: DeviceSurface::default(),
            content: None,
            resize_policy: config.resize_policy,
            button_zoom_in: config.button_zoom_in,
            button_zoom_out: config.button_zoom_out,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.engine.viewport()
    }

    pub fn surface(&self) -> DeviceSurface {
        self.surface
    }

    pub fn router(&self) -> &GestureRouter {
        &self.router
    }

    pub fn is_ready(&self) -> bool {
        self.content.is_some()
    }

    /// Records the decoded pair size and fits it. Returns whether a paint is due.
    pub fn content_loaded(&mut self, combined: (f64, f64)) -> bool {
        self.content = Some(combined);
        self.fit_to_screen()
    }

    /// Applies a new surface size according to the resize policy.
    pub fn resize(&mut self, surface: DeviceSurface) -> bool {
        let old = self.surface;
        self.surface = surface;
        if self.content.is_none() {
            return false;
        }
        match self.resize_policy {
            ResizePolicy::Refit => self.fit_to_screen(),
            ResizePolicy::PreserveCenter if old.is_empty() => self.fit_to_screen(),
            ResizePolicy::PreserveCenter => {
                self.engine.preserve_center(old, surface);
                true
            }
        }
    }

    pub fn fit_to_screen(&mut self) -> bool {
        match self.content {
            Some(content) => self.engine.fit_to_screen(content, self.surface),
            None => false,
        }
    }

    pub fn reset(&mut self) -> bool {
        self.fit_to_screen()
    }

    pub fn zoom(&mut self, factor: f64, anchor_x: f64, anchor_y: f64) -> bool {
        self.is_ready() && self.engine.zoom(factor, anchor_x, anchor_y)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.engine.pan(dx, dy);
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        let (cx, cy) = self.surface.center();
        self.zoom(self.button_zoom_in, cx, cy)
    }

    pub fn zoom_out(&mut self) -> bool {
        let (cx, cy) = self.surface.center();
        self.zoom(self.button_zoom_out, cx, cy)
    }

    fn apply(&mut self, command: Option<GestureCommand>) -> bool {
        match command {
            Some(GestureCommand::Zoom {
                factor,
                anchor_x,
                anchor_y,
            }) => self.zoom(factor, anchor_x, anchor_y),
            Some(GestureCommand::Pan { dx, dy }) => self.pan(dx, dy),
            None => false,
        }
    }

    pub fn on_wheel(&mut self, delta_y: f64, client_x: f64, client_y: f64, frame: SurfaceFrame) -> bool {
        let cmd = self.router.wheel(delta_y, client_x, client_y, frame);
        self.apply(Some(cmd))
    }

    pub fn on_mouse_down(&mut self, button: i16, client_x: f64, client_y: f64) -> bool {
        self.router.mouse_down(button, client_x, client_y)
    }

    pub fn on_mouse_move(&mut self, client_x: f64, client_y: f64, frame: SurfaceFrame) -> bool {
        let cmd = self.router.mouse_move(client_x, client_y, frame);
        self.apply(cmd)
    }

    pub fn on_mouse_up(&mut self) {
        self.router.mouse_up();
    }

    pub fn on_touch_start(&mut self, touches: &[TouchPoint]) {
        self.router.touch_start(touches);
    }

    pub fn on_touch_move(&mut self, touches: &[TouchPoint], frame: SurfaceFrame) -> bool {
        let cmd = self.router.touch_move(touches, frame);
        self.apply(cmd)
    }

    pub fn on_touch_end(&mut self) {
        self.router.touch_end();
    }
}

impl Default for ViewerCore {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}
