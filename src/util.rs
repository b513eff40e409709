// Logging, listener bookkeeping and small DOM helpers shared by the widgets.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AddEventListenerOptions, EventTarget};

use crate::error::ViewerError;

/// `log` backend writing to the browser console.
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::log_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

pub fn init_logging(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

/// A registered DOM listener; unregisters itself when dropped.
pub struct ListenerHandle {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl ListenerHandle {
    pub fn new<E, F>(target: &EventTarget, event: &'static str, mut handler: F) -> Result<Self, ViewerError>
    where
        E: JsCast + 'static,
        F: FnMut(E) + 'static,
    {
        Self::register(target, event, None, move |e: web_sys::Event| {
            if let Ok(e) = e.dyn_into::<E>() {
                handler(e);
            }
        })
    }

    /// Registers with `passive: false` so the handler may call `prevent_default`.
    pub fn active<E, F>(target: &EventTarget, event: &'static str, mut handler: F) -> Result<Self, ViewerError>
    where
        E: JsCast + 'static,
        F: FnMut(E) + 'static,
    {
        let opts = AddEventListenerOptions::new();
        opts.set_passive(false);
        Self::register(target, event, Some(opts), move |e: web_sys::Event| {
            if let Ok(e) = e.dyn_into::<E>() {
                handler(e);
            }
        })
    }

    fn register(
        target: &EventTarget,
        event: &'static str,
        options: Option<AddEventListenerOptions>,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, ViewerError> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
        match options {
            Some(opts) => target.add_event_listener_with_callback_and_add_event_listener_options(
                event,
                callback.as_ref().unchecked_ref(),
                &opts,
            )?,
            None => target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?,
        }
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// One-shot `setTimeout`; cancelled if dropped before it fires.
pub struct Timeout {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Timeout {
    pub fn new(millis: i32, callback: impl FnOnce() + 'static) -> Result<Self, ViewerError> {
        let window = web_sys::window().ok_or_else(|| ViewerError::Js("no window".into()))?;
        let mut callback = Some(callback);
        let closure = Closure::wrap(Box::new(move || {
            if let Some(cb) = callback.take() {
                cb();
            }
        }) as Box<dyn FnMut()>);
        let id = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            millis,
        )?;
        Ok(Self {
            id,
            _callback: closure,
        })
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(self.id);
        }
    }
}

pub fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .filter(|r| *r > 0.0)
        .unwrap_or(1.0)
}
