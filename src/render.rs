use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::model::ImagePair;
use crate::state::{DeviceSurface, Viewport};

/// The handful of 2D context calls the stitch painter needs.
pub trait PaintTarget {
    type Image;

    fn set_transform(&self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64);
    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64);
    fn draw_image(&self, image: &Self::Image, x: f64, y: f64);
}

impl PaintTarget for CanvasRenderingContext2d {
    type Image = HtmlImageElement;

    fn set_transform(&self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        CanvasRenderingContext2d::set_transform(self, a, b, c, d, e, f).ok();
    }

    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::clear_rect(self, x, y, w, h);
    }

    fn draw_image(&self, image: &HtmlImageElement, x: f64, y: f64) {
        if let Err(e) = self.draw_image_with_html_image_element(image, x, y) {
            log::warn!("draw_image failed: {e:?}");
        }
    }
}

/// Clears the whole surface, then draws A at the origin and B right after it.
pub fn paint<T: PaintTarget>(
    target: &T,
    surface: DeviceSurface,
    viewport: Viewport,
    pair: &ImagePair<T::Image>,
) {
    target.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    target.clear_rect(0.0, 0.0, surface.width, surface.height);
    target.set_transform(
        viewport.scale,
        0.0,
        0.0,
        viewport.scale,
        -viewport.offset_x,
        -viewport.offset_y,
    );
    target.draw_image(&pair.image_a, 0.0, 0.0);
    target.draw_image(&pair.image_b, pair.seam_x(), 0.0);
    target.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
}
