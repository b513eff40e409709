// Viewport state and the pan/zoom math that mutates it.
//
// Screen coordinates are physical (device) pixels on the canvas backing store.
// World coordinates are unscaled image pixels of the stitched pair.
//   screen = world * scale - offset
//   world  = (screen + offset) / scale

/// Visible window into the virtual canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

/// Drawing target size in physical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceSurface {
    pub width: f64,
    pub height: f64,
}

impl DeviceSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Surface for a CSS layout box on a display with the given pixel ratio.
    pub fn from_css(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> Self {
        let dpr = if device_pixel_ratio > 0.0 { device_pixel_ratio } else { 1.0 };
        Self::new((css_width * dpr).floor(), (css_height * dpr).floor())
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Sole writer of [`Viewport`]; keeps scale inside `[min_scale, max_scale]`.
#[derive(Debug, Clone)]
pub struct TransformEngine {
    viewport: Viewport,
    min_scale: f64,
    max_scale: f64,
    fit_margin: f64,
}

impl TransformEngine {
    pub fn new(min_scale: f64, max_scale: f64, fit_margin: f64) -> Self {
        let (min_scale, max_scale) = if min_scale <= max_scale {
            (min_scale, max_scale)
        } else {
            (max_scale, min_scale)
        };
        Self {
            viewport: Viewport::default(),
            min_scale,
            max_scale,
            fit_margin,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Largest scale that shows the whole content with margin, centred.
    /// Returns false (and leaves the viewport alone) when either size is degenerate.
    pub fn fit_to_screen(&mut self, content: (f64, f64), surface: DeviceSurface) -> bool {
        let (total_w, total_h) = content;
        if total_w <= 0.0 || total_h <= 0.0 || surface.is_empty() {
            return false;
        }
        let scale_x = surface.width / total_w;
        let scale_y = surface.height / total_h;
        let scale = self.clamp_scale(scale_x.min(scale_y) * self.fit_margin);
        self.viewport = Viewport {
            offset_x: -(surface.width - total_w * scale) / 2.0,
            offset_y: -(surface.height - total_h * scale) / 2.0,
            scale,
        };
        true
    }

    pub fn reset(&mut self, content: (f64, f64), surface: DeviceSurface) -> bool {
        self.fit_to_screen(content, surface)
    }

    /// Multiplies scale by `factor` while the world point under the anchor stays put.
    pub fn zoom(&mut self, factor: f64, anchor_x: f64, anchor_y: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let (world_x, world_y) = self.screen_to_world(anchor_x, anchor_y);
        let scale = self.clamp_scale(self.viewport.scale * factor);
        self.viewport = Viewport {
            offset_x: world_x * scale - anchor_x,
            offset_y: world_y * scale - anchor_y,
            scale,
        };
        true
    }

    /// Dragging the content right moves the window left.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.offset_x -= dx;
        self.viewport.offset_y -= dy;
    }

    /// Re-anchors the view after a resize without discarding the user's zoom.
    pub fn preserve_center(&mut self, old: DeviceSurface, new: DeviceSurface) {
        if old.is_empty() || new.is_empty() {
            return;
        }
        let (old_cx, old_cy) = old.center();
        let (world_x, world_y) = self.screen_to_world(old_cx, old_cy);
        let scale = self.clamp_scale(self.viewport.scale * new.width / old.width);
        let (new_cx, new_cy) = new.center();
        self.viewport = Viewport {
            offset_x: world_x * scale - new_cx,
            offset_y: world_y * scale - new_cy,
            scale,
        };
    }

    pub fn screen_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        let vp = self.viewport;
        ((x + vp.offset_x) / vp.scale, (y + vp.offset_y) / vp.scale)
    }

    pub fn world_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        let vp = self.viewport;
        (x * vp.scale - vp.offset_x, y * vp.scale - vp.offset_y)
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new(0.1, 10.0, 0.95)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= EPS * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn new_viewport_is_identity() {
        let engine = TransformEngine::default();
        assert_eq!(engine.viewport(), Viewport::default());
        assert_eq!(engine.viewport().scale, 1.0);
    }

    #[test]
    fn zoom_keeps_world_point_under_anchor() {
        let mut engine = TransformEngine::default();
        engine.pan(-37.0, 12.5);
        let anchors = [(0.0, 0.0), (400.0, 300.0), (-20.0, 975.5), (1234.0, 5.0)];
        let factors = [1.1, 0.9, 1.3, 0.7, 2.0, 0.5, 1.5];
        for &(ax, ay) in &anchors {
            for &f in &factors {
                let before = engine.screen_to_world(ax, ay);
                assert!(engine.zoom(f, ax, ay));
                let after = engine.screen_to_world(ax, ay);
                assert!(close(before.0, after.0), "{before:?} vs {after:?}");
                assert!(close(before.1, after.1), "{before:?} vs {after:?}");
            }
        }
    }

    #[test]
    fn zoom_preserves_anchor_even_when_clamped() {
        let mut engine = TransformEngine::default();
        let before = engine.screen_to_world(250.0, 125.0);
        engine.zoom(1000.0, 250.0, 125.0);
        assert_eq!(engine.viewport().scale, 10.0);
        let after = engine.screen_to_world(250.0, 125.0);
        assert!(close(before.0, after.0));
        assert!(close(before.1, after.1));
    }

    #[test]
    fn scale_stays_within_bounds_for_any_sequence() {
        let mut engine = TransformEngine::default();
        let factors = [1.3, 1.3, 5.0, 9.0, 1.1, 0.01, 0.7, 0.7, 0.5, 30.0, 0.9, 0.001];
        for (i, f) in factors.iter().cycle().take(200).enumerate() {
            engine.zoom(*f, (i * 7 % 640) as f64, (i * 13 % 480) as f64);
            let s = engine.viewport().scale;
            assert!((0.1..=10.0).contains(&s), "scale {s} escaped bounds");
        }
    }

    #[test]
    fn invalid_zoom_factors_are_ignored() {
        let mut engine = TransformEngine::default();
        let before = engine.viewport();
        assert!(!engine.zoom(0.0, 10.0, 10.0));
        assert!(!engine.zoom(-2.0, 10.0, 10.0));
        assert!(!engine.zoom(f64::NAN, 10.0, 10.0));
        assert!(!engine.zoom(f64::INFINITY, 10.0, 10.0));
        assert_eq!(engine.viewport(), before);
    }

    #[test]
    fn pan_then_inverse_pan_restores_offset() {
        let mut engine = TransformEngine::default();
        engine.zoom(2.0, 100.0, 50.0);
        let before = engine.viewport();
        engine.pan(42.0, -17.0);
        assert_ne!(engine.viewport(), before);
        engine.pan(-42.0, 17.0);
        assert_eq!(engine.viewport(), before);
    }

    #[test]
    fn pan_does_not_touch_scale() {
        let mut engine = TransformEngine::default();
        engine.pan(10.0, 20.0);
        let vp = engine.viewport();
        assert_eq!((vp.offset_x, vp.offset_y, vp.scale), (-10.0, -20.0, 1.0));
    }

    #[test]
    fn fit_to_screen_side_by_side_pair() {
        let mut engine = TransformEngine::default();
        let surface = DeviceSurface::new(1000.0, 800.0);
        assert!(engine.fit_to_screen((1200.0, 800.0), surface));
        let vp = engine.viewport();
        let expected = (1000.0 / 1200.0) * 0.95;
        assert!(close(vp.scale, expected));
        assert!((vp.scale - 0.7917).abs() < 1e-4);
        assert!(close(vp.offset_x, -(1000.0 - 1200.0 * expected) / 2.0));
        assert!(close(vp.offset_x, -25.0));
        assert!(close(vp.offset_y, -(800.0 - 800.0 * expected) / 2.0));
        assert!((vp.offset_y + 83.3333).abs() < 1e-3);
    }

    #[test]
    fn fit_to_screen_is_idempotent() {
        let mut engine = TransformEngine::default();
        let surface = DeviceSurface::new(1366.0, 768.0);
        engine.zoom(3.0, 11.0, 99.0);
        engine.fit_to_screen((2400.0, 1600.0), surface);
        let first = engine.viewport();
        engine.fit_to_screen((2400.0, 1600.0), surface);
        assert_eq!(engine.viewport(), first);
        engine.reset((2400.0, 1600.0), surface);
        assert_eq!(engine.viewport(), first);
    }

    #[test]
    fn fit_to_screen_centres_content() {
        let mut engine = TransformEngine::default();
        let surface = DeviceSurface::new(900.0, 900.0);
        engine.fit_to_screen((300.0, 100.0), surface);
        let (left, top) = engine.world_to_screen(0.0, 0.0);
        let (right, bottom) = engine.world_to_screen(300.0, 100.0);
        assert!(close(left, surface.width - right));
        assert!(close(top, surface.height - bottom));
    }

    #[test]
    fn fit_to_screen_skips_degenerate_inputs() {
        let mut engine = TransformEngine::default();
        engine.pan(5.0, 5.0);
        let before = engine.viewport();
        assert!(!engine.fit_to_screen((0.0, 100.0), DeviceSurface::new(100.0, 100.0)));
        assert!(!engine.fit_to_screen((100.0, 100.0), DeviceSurface::new(0.0, 100.0)));
        assert_eq!(engine.viewport(), before);
    }

    #[test]
    fn fit_scale_respects_bounds() {
        let mut engine = TransformEngine::default();
        engine.fit_to_screen((2.0, 2.0), DeviceSurface::new(4000.0, 4000.0));
        assert_eq!(engine.viewport().scale, 10.0);
        engine.fit_to_screen((100_000.0, 100_000.0), DeviceSurface::new(100.0, 100.0));
        assert_eq!(engine.viewport().scale, 0.1);
    }

    #[test]
    fn screen_world_conversions_invert() {
        let mut engine = TransformEngine::default();
        engine.zoom(2.5, 300.0, 200.0);
        engine.pan(-13.0, 44.0);
        let (wx, wy) = engine.screen_to_world(123.0, 456.0);
        let (sx, sy) = engine.world_to_screen(wx, wy);
        assert!(close(sx, 123.0));
        assert!(close(sy, 456.0));
    }

    #[test]
    fn preserve_center_keeps_centre_world_point() {
        let mut engine = TransformEngine::default();
        let old = DeviceSurface::new(800.0, 600.0);
        let new = DeviceSurface::new(1600.0, 1000.0);
        engine.fit_to_screen((1000.0, 500.0), old);
        engine.zoom(1.8, 200.0, 100.0);
        let (ocx, ocy) = old.center();
        let centre_world = engine.screen_to_world(ocx, ocy);
        let old_scale = engine.viewport().scale;
        engine.preserve_center(old, new);
        let (ncx, ncy) = new.center();
        let after = engine.screen_to_world(ncx, ncy);
        assert!(close(centre_world.0, after.0));
        assert!(close(centre_world.1, after.1));
        assert!(close(engine.viewport().scale, old_scale * 2.0));
    }

    #[test]
    fn device_surface_from_css_applies_pixel_ratio() {
        let s = DeviceSurface::from_css(500.0, 400.0, 2.0);
        assert_eq!(s, DeviceSurface::new(1000.0, 800.0));
        let fallback = DeviceSurface::from_css(500.0, 400.0, 0.0);
        assert_eq!(fallback, DeviceSurface::new(500.0, 400.0));
        assert!(DeviceSurface::new(-3.0, 10.0).is_empty());
    }
}
