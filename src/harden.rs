// Locks pixel read-back on the viewer canvas.

use js_sys::{Object, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::ViewerError;

pub const CANVAS_EXPORT_METHODS: [&str; 3] = ["toDataURL", "toBlob", "getImageData"];
pub const CONTEXT_EXPORT_METHODS: [&str; 1] = ["getImageData"];

fn throwing_descriptor() -> Result<Object, ViewerError> {
    // A Rust closure rather than `new Function`, which CSP without unsafe-eval blocks.
    let thrower = Closure::wrap(Box::new(|| -> () {
        wasm_bindgen::throw_str(&ViewerError::ExportDisabled.to_string())
    }) as Box<dyn FnMut()>)
    .into_js_value();
    let descriptor = Object::new();
    Reflect::set(&descriptor, &"value".into(), &thrower)?;
    Reflect::set(&descriptor, &"writable".into(), &JsValue::FALSE)?;
    Reflect::set(&descriptor, &"configurable".into(), &JsValue::FALSE)?;
    Reflect::set(&descriptor, &"enumerable".into(), &JsValue::FALSE)?;
    Ok(descriptor)
}

fn lock(target: &Object, methods: &[&str]) -> Result<(), ViewerError> {
    let descriptor = throwing_descriptor()?;
    for name in methods {
        // Own non-configurable properties cannot be redefined; a second call is a no-op.
        let key = JsValue::from_str(name);
        if Object::get_own_property_descriptor(target, &key).is_object() {
            continue;
        }
        if !Reflect::define_property(target, &key, &descriptor)? {
            log::warn!("could not lock canvas method {name}");
        }
    }
    Ok(())
}

/// Replaces export methods on the canvas (and its 2D context) with throwers
/// that can be neither overwritten nor reconfigured.
pub fn harden_canvas(
    canvas: &HtmlCanvasElement,
    ctx: &CanvasRenderingContext2d,
) -> Result<(), ViewerError> {
    lock(canvas.as_ref(), &CANVAS_EXPORT_METHODS)?;
    lock(ctx.as_ref(), &CONTEXT_EXPORT_METHODS)?;
    log::debug!("canvas export methods disabled");
    Ok(())
}
