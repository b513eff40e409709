// Pointer/touch/wheel gesture state, normalized into device-pixel pan/zoom commands.

/// Where the drawing surface sits in client (CSS pixel) space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFrame {
    pub left: f64,
    pub top: f64,
    pub device_pixel_ratio: f64,
}

impl SurfaceFrame {
    pub fn new(left: f64, top: f64, device_pixel_ratio: f64) -> Self {
        let device_pixel_ratio = if device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            left,
            top,
            device_pixel_ratio,
        }
    }

    /// Client CSS position to device pixels on the surface.
    pub fn to_device(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        (
            (client_x - self.left) * self.device_pixel_ratio,
            (client_y - self.top) * self.device_pixel_ratio,
        )
    }

    /// CSS-pixel delta to device-pixel delta.
    pub fn scale_delta(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx * self.device_pixel_ratio, dy * self.device_pixel_ratio)
    }
}

impl Default for SurfaceFrame {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GesturePhase {
    #[default]
    Idle,
    Dragging,
    Pinching,
}

/// Transient per-interaction state; reset when the gesture ends.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureSession {
    pub phase: GesturePhase,
    pub last_pointer_x: f64,
    pub last_pointer_y: f64,
    /// Zero means "not recorded".
    pub last_pinch_distance: f64,
}

impl GestureSession {
    pub fn is_dragging(&self) -> bool {
        self.phase == GesturePhase::Dragging
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureCommand {
    Zoom {
        factor: f64,
        anchor_x: f64,
        anchor_y: f64,
    },
    Pan {
        dx: f64,
        dy: f64,
    },
}

/// Client-space position of one active touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub client_x: f64,
    pub client_y: f64,
}

impl TouchPoint {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

fn pinch_geometry(a: TouchPoint, b: TouchPoint) -> (f64, f64, f64) {
    let distance = (b.client_x - a.client_x).hypot(b.client_y - a.client_y);
    let mid_x = (a.client_x + b.client_x) / 2.0;
    let mid_y = (a.client_y + b.client_y) / 2.0;
    (distance, mid_x, mid_y)
}

const PRIMARY_BUTTON: i16 = 0;

#[derive(Debug, Clone)]
pub struct GestureRouter {
    session: GestureSession,
    wheel_zoom_in: f64,
    wheel_zoom_out: f64,
}

impl Default for GestureRouter {
    fn default() -> Self {
        Self::new(1.1, 0.9)
    }
}

impl GestureRouter {
    pub fn new(wheel_zoom_in: f64, wheel_zoom_out: f64) -> Self {
        Self {
            session: GestureSession::default(),
            wheel_zoom_in,
            wheel_zoom_out,
        }
    }

    pub fn session(&self) -> GestureSession {
        self.session
    }

    /// Scrolling down/forward zooms out; anything else zooms in.
    pub fn wheel(
        &self,
        delta_y: f64,
        client_x: f64,
        client_y: f64,
        frame: SurfaceFrame,
    ) -> GestureCommand {
        let factor = if delta_y > 0.0 {
            self.wheel_zoom_out
        } else {
            self.wheel_zoom_in
        };
        let (anchor_x, anchor_y) = frame.to_device(client_x, client_y);
        GestureCommand::Zoom {
            factor,
            anchor_x,
            anchor_y,
        }
    }

    /// Returns true when the press started a drag.
    pub fn mouse_down(&mut self, button: i16, client_x: f64, client_y: f64) -> bool {
        if button != PRIMARY_BUTTON {
            return false;
        }
        self.begin_drag(client_x, client_y);
        true
    }

    pub fn mouse_move(
        &mut self,
        client_x: f64,
        client_y: f64,
        frame: SurfaceFrame,
    ) -> Option<GestureCommand> {
        if !self.session.is_dragging() {
            return None;
        }
        Some(self.drag_to(client_x, client_y, frame))
    }

    /// Button release, or the pointer leaving the window while held.
    pub fn mouse_up(&mut self) {
        self.end();
    }

    pub fn touch_start(&mut self, touches: &[TouchPoint]) {
        match touches {
            [only] => self.begin_drag(only.client_x, only.client_y),
            [a, b] => {
                let (distance, _, _) = pinch_geometry(*a, *b);
                self.session.phase = GesturePhase::Pinching;
                self.session.last_pinch_distance = distance;
            }
            _ => {}
        }
    }

    pub fn touch_move(
        &mut self,
        touches: &[TouchPoint],
        frame: SurfaceFrame,
    ) -> Option<GestureCommand> {
        match touches {
            [only] if self.session.is_dragging() => {
                Some(self.drag_to(only.client_x, only.client_y, frame))
            }
            [a, b] => {
                let (distance, mid_x, mid_y) = pinch_geometry(*a, *b);
                let previous = self.session.last_pinch_distance;
                self.session.phase = GesturePhase::Pinching;
                self.session.last_pinch_distance = distance;
                if previous > 0.0 {
                    let (anchor_x, anchor_y) = frame.to_device(mid_x, mid_y);
                    Some(GestureCommand::Zoom {
                        factor: distance / previous,
                        anchor_x,
                        anchor_y,
                    })
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn touch_end(&mut self) {
        self.end();
    }

    fn begin_drag(&mut self, client_x: f64, client_y: f64) {
        self.session.phase = GesturePhase::Dragging;
        self.session.last_pointer_x = client_x;
        self.session.last_pointer_y = client_y;
    }

    fn drag_to(&mut self, client_x: f64, client_y: f64, frame: SurfaceFrame) -> GestureCommand {
        let dx = client_x - self.session.last_pointer_x;
        let dy = client_y - self.session.last_pointer_y;
        self.session.last_pointer_x = client_x;
        self.session.last_pointer_y = client_y;
        let (dx, dy) = frame.scale_delta(dx, dy);
        GestureCommand::Pan { dx, dy }
    }

    fn end(&mut self) {
        self.session = GestureSession::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retina() -> SurfaceFrame {
        SurfaceFrame::new(10.0, 20.0, 2.0)
    }

    fn zoom_factor(cmd: Option<GestureCommand>) -> Option<f64> {
        match cmd {
            Some(GestureCommand::Zoom { factor, .. }) => Some(factor),
            _ => None,
        }
    }

    #[test]
    fn wheel_direction_picks_factor_and_converts_anchor() {
        let router = GestureRouter::default();
        assert_eq!(
            router.wheel(120.0, 60.0, 70.0, retina()),
            GestureCommand::Zoom {
                factor: 0.9,
                anchor_x: 100.0,
                anchor_y: 100.0
            }
        );
        assert_eq!(zoom_factor(Some(router.wheel(-3.0, 0.0, 0.0, retina()))), Some(1.1));
        assert_eq!(router.session().phase, GesturePhase::Idle);
    }

    #[test]
    fn mouse_drag_emits_device_pixel_deltas() {
        let mut router = GestureRouter::default();
        assert!(router.mouse_down(0, 100.0, 100.0));
        assert!(router.session().is_dragging());
        assert_eq!(
            router.mouse_move(110.0, 95.0, retina()),
            Some(GestureCommand::Pan { dx: 20.0, dy: -10.0 })
        );
        assert_eq!(
            router.mouse_move(111.0, 95.0, retina()),
            Some(GestureCommand::Pan { dx: 2.0, dy: 0.0 })
        );
        router.mouse_up();
        assert_eq!(router.session(), GestureSession::default());
        assert_eq!(router.mouse_move(200.0, 200.0, retina()), None);
    }

    #[test]
    fn non_primary_buttons_are_ignored() {
        let mut router = GestureRouter::default();
        assert!(!router.mouse_down(1, 0.0, 0.0));
        assert!(!router.mouse_down(2, 0.0, 0.0));
        assert_eq!(router.session().phase, GesturePhase::Idle);
        assert_eq!(router.mouse_move(5.0, 5.0, SurfaceFrame::default()), None);
    }

    #[test]
    fn single_touch_pans_like_mouse() {
        let mut router = GestureRouter::default();
        router.touch_start(&[TouchPoint::new(50.0, 50.0)]);
        assert_eq!(router.session().phase, GesturePhase::Dragging);
        assert_eq!(
            router.touch_move(&[TouchPoint::new(40.0, 65.0)], retina()),
            Some(GestureCommand::Pan { dx: -20.0, dy: 30.0 })
        );
        router.touch_end();
        assert_eq!(router.session().phase, GesturePhase::Idle);
        assert_eq!(router.touch_move(&[TouchPoint::new(0.0, 0.0)], retina()), None);
    }

    #[test]
    fn pinch_ratio_drives_zoom_and_distance_updates_every_frame() {
        let mut router = GestureRouter::default();
        router.touch_start(&[TouchPoint::new(0.0, 0.0), TouchPoint::new(100.0, 0.0)]);
        assert_eq!(router.session().phase, GesturePhase::Pinching);
        assert_eq!(router.session().last_pinch_distance, 100.0);

        let spread = router.touch_move(
            &[TouchPoint::new(0.0, 0.0), TouchPoint::new(150.0, 0.0)],
            SurfaceFrame::default(),
        );
        assert_eq!(zoom_factor(spread), Some(1.5));
        assert_eq!(router.session().last_pinch_distance, 150.0);

        let squeeze = router.touch_move(
            &[TouchPoint::new(0.0, 0.0), TouchPoint::new(100.0, 0.0)],
            SurfaceFrame::default(),
        );
        let factor = zoom_factor(squeeze).unwrap();
        assert!((factor - 0.6667).abs() < 1e-4);
        assert_eq!(router.session().last_pinch_distance, 100.0);
    }

    #[test]
    fn pinch_anchor_is_midpoint_in_device_pixels() {
        let mut router = GestureRouter::default();
        router.touch_start(&[TouchPoint::new(10.0, 20.0), TouchPoint::new(50.0, 20.0)]);
        let cmd = router.touch_move(
            &[TouchPoint::new(10.0, 20.0), TouchPoint::new(90.0, 80.0)],
            retina(),
        );
        match cmd {
            Some(GestureCommand::Zoom {
                anchor_x, anchor_y, ..
            }) => {
                assert_eq!(anchor_x, (50.0 - 10.0) * 2.0);
                assert_eq!(anchor_y, (50.0 - 20.0) * 2.0);
            }
            other => panic!("expected zoom, got {other:?}"),
        }
    }

    #[test]
    fn pinch_without_recorded_distance_only_records() {
        let mut router = GestureRouter::default();
        // Second finger arrives mid-drag without a two-touch start.
        router.touch_start(&[TouchPoint::new(0.0, 0.0)]);
        let cmd = router.touch_move(
            &[TouchPoint::new(0.0, 0.0), TouchPoint::new(0.0, 80.0)],
            SurfaceFrame::default(),
        );
        assert_eq!(cmd, None);
        assert_eq!(router.session().last_pinch_distance, 80.0);
        let next = router.touch_move(
            &[TouchPoint::new(0.0, 0.0), TouchPoint::new(0.0, 160.0)],
            SurfaceFrame::default(),
        );
        assert_eq!(zoom_factor(next), Some(2.0));
    }

    #[test]
    fn touch_end_clears_pinch_distance() {
        let mut router = GestureRouter::default();
        router.touch_start(&[TouchPoint::new(0.0, 0.0), TouchPoint::new(30.0, 40.0)]);
        assert_eq!(router.session().last_pinch_distance, 50.0);
        router.touch_end();
        assert_eq!(router.session().last_pinch_distance, 0.0);
        let cmd = router.touch_move(
            &[TouchPoint::new(0.0, 0.0), TouchPoint::new(60.0, 80.0)],
            SurfaceFrame::default(),
        );
        assert_eq!(cmd, None);
    }

    #[test]
    fn three_finger_touches_are_ignored() {
        let mut router = GestureRouter::default();
        let three = [
            TouchPoint::new(0.0, 0.0),
            TouchPoint::new(1.0, 1.0),
            TouchPoint::new(2.0, 2.0),
        ];
        router.touch_start(&three);
        assert_eq!(router.session().phase, GesturePhase::Idle);
        assert_eq!(router.touch_move(&three, SurfaceFrame::default()), None);
    }
}
