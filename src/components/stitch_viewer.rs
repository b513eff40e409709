use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, Element, HtmlCanvasElement, HtmlImageElement, MouseEvent, TouchEvent,
    TouchList, WheelEvent,
};
use yew::AppHandle;
use yew::prelude::*;

use super::viewer_controls::ViewerControls;
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::harden::harden_canvas;
use crate::loader::{PendingPair, load_pair};
use crate::model::ImagePair;
use crate::render::paint;
use crate::state::{DeviceSurface, SurfaceFrame, TouchPoint, ViewerCore};
use crate::util::{ListenerHandle, device_pixel_ratio};

#[derive(Properties, PartialEq, Clone)]
pub struct StitchViewerProps {
    pub src_a: AttrValue,
    pub src_b: AttrValue,
    #[prop_or_default]
    pub config: Rc<ViewerConfig>,
}

type DrawRef = Rc<RefCell<Option<Rc<dyn Fn()>>>>;

/// Inputs whose change tears the viewer down and rebuilds it.
type SessionDeps = (AttrValue, AttrValue, Rc<ViewerConfig>);

fn session_deps(props: &StitchViewerProps) -> SessionDeps {
    (
        props.src_a.clone(),
        props.src_b.clone(),
        props.config.clone(),
    )
}

fn redraw(draw_ref: &DrawRef) {
    if let Some(f) = &*draw_ref.borrow() {
        f();
    }
}

/// Everything one mounted viewer keeps alive; dropping it detaches all listeners.
struct ViewerSession {
    _listeners: Vec<ListenerHandle>,
    _pending: PendingPair,
}

fn touch_points(list: &TouchList) -> Vec<TouchPoint> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| TouchPoint::new(t.client_x() as f64, t.client_y() as f64))
        .collect()
}

fn opaque_context(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, ViewerError> {
    let opts = Object::new();
    Reflect::set(&opts, &"alpha".into(), &JsValue::FALSE)?;
    canvas
        .get_context_with_context_options("2d", &opts)?
        .ok_or_else(|| ViewerError::Js("2d context unavailable".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| ViewerError::Js("unexpected 2d context type".into()))
}

fn set_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
    canvas.style().set_property("cursor", cursor).ok();
}

fn attach_viewer(
    canvas: HtmlCanvasElement,
    src_a: &str,
    src_b: &str,
    core: Rc<RefCell<ViewerCore>>,
    draw_ref: DrawRef,
    on_error: Callback<ViewerError>,
) -> Result<ViewerSession, ViewerError> {
    let window = web_sys::window().ok_or_else(|| ViewerError::Js("no window".into()))?;
    let ctx = opaque_context(&canvas)?;
    harden_canvas(&canvas, &ctx)?;

    // Backing store follows the container's layout box in device pixels.
    let measure: Rc<dyn Fn() -> DeviceSurface> = {
        let canvas = canvas.clone();
        Rc::new(move || {
            let Some(parent) = canvas.parent_element() else {
                return DeviceSurface::new(canvas.width() as f64, canvas.height() as f64);
            };
            let rect = parent.get_bounding_client_rect();
            let surface = DeviceSurface::from_css(rect.width(), rect.height(), device_pixel_ratio());
            canvas.set_width(surface.width as u32);
            canvas.set_height(surface.height as u32);
            let style = canvas.style();
            style.set_property("width", &format!("{}px", rect.width())).ok();
            style.set_property("height", &format!("{}px", rect.height())).ok();
            surface
        })
    };
    let frame = {
        let canvas = canvas.clone();
        move || {
            let rect = canvas.get_bounding_client_rect();
            SurfaceFrame::new(rect.left(), rect.top(), device_pixel_ratio())
        }
    };

    let pair: Rc<RefCell<Option<ImagePair<HtmlImageElement>>>> = Rc::new(RefCell::new(None));
    let draw: Rc<dyn Fn()> = {
        let core = core.clone();
        let pair = pair.clone();
        Rc::new(move || {
            if let Some(p) = pair.borrow().as_ref() {
                let c = core.borrow();
                paint(&ctx, c.surface(), c.viewport(), p);
            }
        })
    };
    *draw_ref.borrow_mut() = Some(draw.clone());

    core.borrow_mut().resize(measure());

    let pending = {
        let core = core.clone();
        let pair = pair.clone();
        let measure = measure.clone();
        let draw = draw.clone();
        load_pair(src_a, src_b, move |result| match result {
            Ok(loaded) => {
                let combined = loaded.combined_size();
                log::info!("image pair ready, combined {}x{}", combined.0, combined.1);
                *pair.borrow_mut() = Some(loaded);
                {
                    let mut c = core.borrow_mut();
                    c.resize(measure());
                    c.content_loaded(combined);
                }
                draw();
            }
            Err(e) => {
                log::error!("stitch viewer: {e}");
                on_error.emit(e);
            }
        })?
    };

    let canvas_target: &web_sys::EventTarget = canvas.as_ref();
    let window_target: &web_sys::EventTarget = window.as_ref();
    let mut listeners = Vec::with_capacity(10);

    listeners.push(ListenerHandle::active(canvas_target, "wheel", {
        let core = core.clone();
        let draw = draw.clone();
        let frame = frame.clone();
        move |e: WheelEvent| {
            e.prevent_default();
            let moved = core.borrow_mut().on_wheel(
                e.delta_y(),
                e.client_x() as f64,
                e.client_y() as f64,
                frame(),
            );
            if moved {
                draw();
            }
        }
    })?);

    listeners.push(ListenerHandle::new(canvas_target, "mousedown", {
        let core = core.clone();
        let canvas = canvas.clone();
        move |e: MouseEvent| {
            if core
                .borrow_mut()
                .on_mouse_down(e.button(), e.client_x() as f64, e.client_y() as f64)
            {
                set_cursor(&canvas, "grabbing");
            }
        }
    })?);

    listeners.push(ListenerHandle::new(window_target, "mousemove", {
        let core = core.clone();
        let draw = draw.clone();
        let frame = frame.clone();
        move |e: MouseEvent| {
            if !core.borrow().router().session().is_dragging() {
                return;
            }
            e.prevent_default();
            let moved =
                core.borrow_mut()
                    .on_mouse_move(e.client_x() as f64, e.client_y() as f64, frame());
            if moved {
                draw();
            }
        }
    })?);

    let release = {
        let core = core.clone();
        let canvas = canvas.clone();
        Rc::new(move || {
            core.borrow_mut().on_mouse_up();
            set_cursor(&canvas, "grab");
        })
    };
    listeners.push(ListenerHandle::new(window_target, "mouseup", {
        let release = release.clone();
        move |_e: MouseEvent| release()
    })?);
    // Pointer leaving the window while the button is held.
    listeners.push(ListenerHandle::new(window_target, "mouseout", {
        let release = release.clone();
        move |e: MouseEvent| {
            if e.related_target().is_none() {
                release();
            }
        }
    })?);

    listeners.push(ListenerHandle::new(canvas_target, "touchstart", {
        let core = core.clone();
        move |e: TouchEvent| {
            core.borrow_mut().on_touch_start(&touch_points(&e.touches()));
        }
    })?);

    listeners.push(ListenerHandle::active(window_target, "touchmove", {
        let core = core.clone();
        let draw = draw.clone();
        let frame = frame.clone();
        move |e: TouchEvent| {
            let touches = touch_points(&e.touches());
            if touches.len() == 2 {
                e.prevent_default();
            }
            let moved = core.borrow_mut().on_touch_move(&touches, frame());
            if moved {
                draw();
            }
        }
    })?);

    for event in ["touchend", "touchcancel"] {
        listeners.push(ListenerHandle::new(window_target, event, {
            let core = core.clone();
            move |_e: TouchEvent| core.borrow_mut().on_touch_end()
        })?);
    }

    listeners.push(ListenerHandle::new(
        canvas_target,
        "contextmenu",
        |e: web_sys::Event| e.prevent_default(),
    )?);

    listeners.push(ListenerHandle::new(window_target, "resize", {
        let core = core.clone();
        let draw = draw.clone();
        move |_e: web_sys::Event| {
            let surface = measure();
            core.borrow_mut().resize(surface);
            // Resizing the backing store wipes it, so always repaint.
            draw();
        }
    })?);

    set_cursor(&canvas, "grab");

    Ok(ViewerSession {
        _listeners: listeners,
        _pending: pending,
    })
}

#[function_component(StitchViewer)]
pub fn stitch_viewer(props: &StitchViewerProps) -> Html {
    let canvas_ref = use_node_ref();
    let config = props.config.clone();
    let core = use_mut_ref(|| ViewerCore::new(&config));
    let draw_ref: DrawRef = use_mut_ref(|| None::<Rc<dyn Fn()>>);
    let load_error = use_state(|| None::<ViewerError>);

    {
        let canvas_ref = canvas_ref.clone();
        let core = core.clone();
        let draw_ref = draw_ref.clone();
        let load_error = load_error.clone();
        use_effect_with(
            session_deps(props),
            move |(src_a, src_b, config): &SessionDeps| {
                load_error.set(None);
                *core.borrow_mut() = ViewerCore::new(config);
                let on_error = {
                    let load_error = load_error.clone();
                    Callback::from(move |e: ViewerError| load_error.set(Some(e)))
                };
                let session = match canvas_ref.cast::<HtmlCanvasElement>() {
                    Some(canvas) => {
                        match attach_viewer(canvas, src_a, src_b, core, draw_ref.clone(), on_error) {
                            Ok(session) => Some(session),
                            Err(e) => {
                                log::error!("stitch viewer setup failed: {e}");
                                load_error.set(Some(e));
                                None
                            }
                        }
                    }
                    None => {
                        log::error!("stitch viewer canvas not mounted");
                        None
                    }
                };
                move || {
                    draw_ref.borrow_mut().take();
                    drop(session);
                }
            },
        );
    }

    let control = |action: fn(&mut ViewerCore) -> bool| {
        let core = core.clone();
        let draw_ref = draw_ref.clone();
        Callback::from(move |_: ()| {
            let moved = action(&mut core.borrow_mut());
            if moved {
                redraw(&draw_ref);
            }
        })
    };
    let on_zoom_in = control(ViewerCore::zoom_in);
    let on_zoom_out = control(ViewerCore::zoom_out);
    let on_reset = control(ViewerCore::reset);

    html! {
        <div class="stitch-viewer" style="position:relative; width:100%; height:100%; overflow:hidden;">
            <canvas ref={canvas_ref} style="display:block; touch-action:none;" />
            if let Some(err) = &*load_error {
                <div class="stitch-viewer-error" style="position:absolute; inset:0; display:flex; align-items:center; justify-content:center; color:#f85149;">
                    { err.to_string() }
                </div>
            }
            <ViewerControls {on_zoom_in} {on_zoom_out} {on_reset} />
        </div>
    }
}

/// Mounts a standalone viewer under `root`, outside any yew tree.
pub fn mount_stitch_viewer(
    root: Element,
    src_a: &str,
    src_b: &str,
    config: Rc<ViewerConfig>,
) -> AppHandle<StitchViewer> {
    let props = StitchViewerProps {
        src_a: AttrValue::from(src_a.to_string()),
        src_b: AttrValue::from(src_b.to_string()),
        config,
    };
    yew::Renderer::<StitchViewer>::with_root_and_props(root, props).render()
}
