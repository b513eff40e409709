// DOM side of the lightbox: the page's modal markup, the global Panzoom
// library, and the listeners that live only while the modal is open.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, KeyboardEvent, MouseEvent};
use yew::AppHandle;

use crate::components::stitch_viewer::{StitchViewer, mount_stitch_viewer};
use crate::config::{PanZoomOptions, ViewerConfig};
use crate::error::ViewerError;
use crate::model::{Photo, PhotoDisplay};
use crate::state::lightbox::{
    CONTAINER_ID, COUNTER_ID, LightboxController, MODAL_ID, ModalHost, PanZoomProvider, TITLE_ID,
};
use crate::util::{ListenerHandle, Timeout};

const CLOSE_BUTTON_ID: &str = "lightbox-close";
const PREV_BUTTON_ID: &str = "lightbox-prev";
const NEXT_BUTTON_ID: &str = "lightbox-next";

pub struct DomModalHost {
    document: Document,
    config: Rc<ViewerConfig>,
    stitch: Option<AppHandle<StitchViewer>>,
}

impl DomModalHost {
    pub fn new(document: Document, config: Rc<ViewerConfig>) -> Self {
        Self {
            document,
            config,
            stitch: None,
        }
    }

    fn element(&self, id: &str) -> Result<Element, ViewerError> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| ViewerError::missing(id))
    }

    fn unmount_stitch(&mut self) {
        if let Some(app) = self.stitch.take() {
            app.destroy();
        }
    }

    fn build_single(&self, photo: &Photo, src: &str) -> Result<Element, ViewerError> {
        let img = self.document.create_element("img")?;
        img.set_class_name("lightbox-img");
        img.set_attribute("src", src)?;
        img.set_attribute("alt", &photo.name)?;
        Ok(img)
    }
}

impl ModalHost for DomModalHost {
    type Element = HtmlElement;

    fn verify(&self) -> Result<(), ViewerError> {
        for id in [MODAL_ID, CONTAINER_ID, TITLE_ID, COUNTER_ID] {
            self.element(id)?;
        }
        Ok(())
    }

    fn show_photo(&mut self, photo: &Photo) -> Result<(), ViewerError> {
        let container = self.element(CONTAINER_ID)?;
        self.unmount_stitch();
        container.set_inner_html("");
        match &photo.display {
            PhotoDisplay::Split { src_a, src_b } => {
                let root = self.document.create_element("div")?;
                root.set_class_name("stitch-container");
                container.append_child(&root)?;
                self.stitch = Some(mount_stitch_viewer(
                    root,
                    src_a,
                    src_b,
                    self.config.clone(),
                ));
            }
            PhotoDisplay::Single { src } => {
                let img = self.build_single(photo, src)?;
                container.append_child(&img)?;
            }
        }
        Ok(())
    }

    fn set_caption(&mut self, title: &str, counter: &str) {
        if let Ok(el) = self.element(TITLE_ID) {
            el.set_text_content(Some(title));
        }
        if let Ok(el) = self.element(COUNTER_ID) {
            el.set_text_content(Some(counter));
        }
    }

    fn set_visible(&mut self, visible: bool) {
        if let Ok(modal) = self.element(MODAL_ID) {
            let classes = modal.class_list();
            let res = if visible {
                classes.add_1("active")
            } else {
                classes.remove_1("active")
            };
            if let Err(e) = res {
                log::warn!("toggling modal class failed: {e:?}");
            }
        }
        if let Some(body) = self.document.body() {
            body.style()
                .set_property("overflow", if visible { "hidden" } else { "" })
                .ok();
        }
    }

    fn clear_content(&mut self) {
        self.unmount_stitch();
        if let Ok(container) = self.element(CONTAINER_ID) {
            container.set_inner_html("");
        }
    }

    fn panzoom_target(&self) -> Option<HtmlElement> {
        self.element(CONTAINER_ID)
            .ok()?
            .first_element_child()?
            .dyn_into::<HtmlElement>()
            .ok()
    }
}

/// The page's `window.Panzoom` factory, looked up on every attach.
pub struct GlobalPanzoom;

pub struct PanZoomHandle {
    instance: JsValue,
    _wheel: Option<ListenerHandle>,
}

fn panzoom_options(options: &PanZoomOptions) -> Result<Object, JsValue> {
    let obj = Object::new();
    Reflect::set(&obj, &"minScale".into(), &options.min_scale.into())?;
    Reflect::set(&obj, &"maxScale".into(), &options.max_scale.into())?;
    Reflect::set(&obj, &"contain".into(), &options.contain.as_str().into())?;
    Ok(obj)
}

impl GlobalPanzoom {
    fn try_attach(
        &self,
        element: &HtmlElement,
        options: &PanZoomOptions,
    ) -> Result<Option<PanZoomHandle>, ViewerError> {
        let window = web_sys::window().ok_or_else(|| ViewerError::Js("no window".into()))?;
        let Ok(factory) = Reflect::get(&window, &"Panzoom".into())?.dyn_into::<Function>() else {
            log::warn!("Panzoom not loaded");
            return Ok(None);
        };
        let instance = factory.call2(&JsValue::NULL, element, &panzoom_options(options)?.into())?;

        // Wheel zoom is forwarded from the container, not the image itself.
        let wheel = match (
            Reflect::get(&instance, &"zoomWithWheel".into())?.dyn_into::<Function>(),
            element.parent_element(),
        ) {
            (Ok(zoom_with_wheel), Some(parent)) => {
                let instance = instance.clone();
                Some(ListenerHandle::active(
                    parent.as_ref(),
                    "wheel",
                    move |e: web_sys::WheelEvent| {
                        if let Err(err) = zoom_with_wheel.call1(&instance, &e) {
                            log::warn!("zoomWithWheel failed: {err:?}");
                        }
                    },
                )?)
            }
            _ => None,
        };
        log::debug!("Panzoom attached");
        Ok(Some(PanZoomHandle {
            instance,
            _wheel: wheel,
        }))
    }
}

impl PanZoomProvider for GlobalPanzoom {
    type Element = HtmlElement;
    type Handle = PanZoomHandle;

    fn attach(&self, element: &HtmlElement, options: &PanZoomOptions) -> Option<PanZoomHandle> {
        self.try_attach(element, options).unwrap_or_else(|e| {
            log::error!("Panzoom attach failed: {e}");
            None
        })
    }

    fn dispose(&self, handle: PanZoomHandle) {
        let dispose = Reflect::get(&handle.instance, &"dispose".into())
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok());
        if let Some(f) = dispose {
            if let Err(e) = f.call0(&handle.instance) {
                log::warn!("Panzoom dispose failed: {e:?}");
            }
        }
    }
}

pub type DomController = LightboxController<DomModalHost, GlobalPanzoom>;

/// Lightbox wired to the live document.
pub struct Lightbox {
    controller: RefCell<DomController>,
    document: Document,
    settle_delay_ms: i32,
    keydown: RefCell<Option<ListenerHandle>>,
    settle: RefCell<Option<(u64, Timeout)>>,
    _buttons: Vec<ListenerHandle>,
}

impl Lightbox {
    pub fn new(
        photos: Vec<Photo>,
        document: Document,
        config: Rc<ViewerConfig>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Lightbox>| {
            let host = DomModalHost::new(document.clone(), config.clone());
            let controller =
                LightboxController::new(photos, host, GlobalPanzoom, config.panzoom.clone());
            let buttons = wire_buttons(&document, weak);
            Lightbox {
                controller: RefCell::new(controller),
                document,
                settle_delay_ms: config.settle_delay_ms,
                keydown: RefCell::new(None),
                settle: RefCell::new(None),
                _buttons: buttons,
            }
        })
    }

    pub fn open(self: &Rc<Self>, index: usize) {
        let res = self.controller.borrow_mut().open(index);
        if let Err(e) = res {
            log::error!("lightbox open failed: {e}");
        }
        self.sync();
    }

    pub fn close(self: &Rc<Self>) {
        self.controller.borrow_mut().close();
        self.sync();
    }

    pub fn next(self: &Rc<Self>) {
        self.controller.borrow_mut().next();
        self.sync();
    }

    pub fn prev(self: &Rc<Self>) {
        self.controller.borrow_mut().prev();
        self.sync();
    }

    /// Brings session listeners and the pending pan/zoom attach in line with controller state.
    fn sync(self: &Rc<Self>) {
        let (open, pending) = {
            let c = self.controller.borrow();
            (c.is_open(), c.pending_attach())
        };

        if open {
            if self.keydown.borrow().is_none() {
                let weak = Rc::downgrade(self);
                let handle = ListenerHandle::new(self.document.as_ref(), "keydown", move |e: KeyboardEvent| {
                    if let Some(lb) = weak.upgrade() {
                        let handled = lb.controller.borrow_mut().handle_key(&e.key());
                        if handled {
                            lb.sync();
                        }
                    }
                });
                match handle {
                    Ok(h) => *self.keydown.borrow_mut() = Some(h),
                    Err(e) => log::error!("keyboard binding failed: {e}"),
                }
            }
        } else {
            self.keydown.borrow_mut().take();
        }

        let scheduled = self.settle.borrow().as_ref().map(|(g, _)| *g);
        match pending {
            Some(generation) if scheduled != Some(generation) => {
                let weak = Rc::downgrade(self);
                let timeout = Timeout::new(self.settle_delay_ms, move || {
                    if let Some(lb) = weak.upgrade() {
                        lb.controller.borrow_mut().attach_panzoom(generation);
                    }
                });
                match timeout {
                    Ok(t) => *self.settle.borrow_mut() = Some((generation, t)),
                    Err(e) => log::error!("could not schedule Panzoom: {e}"),
                }
            }
            Some(_) => {}
            None => {
                self.settle.borrow_mut().take();
            }
        }
    }
}

fn wire_buttons(document: &Document, weak: &Weak<Lightbox>) -> Vec<ListenerHandle> {
    let actions: [(&str, fn(&Rc<Lightbox>)); 3] = [
        (CLOSE_BUTTON_ID, Lightbox::close),
        (PREV_BUTTON_ID, Lightbox::prev),
        (NEXT_BUTTON_ID, Lightbox::next),
    ];
    let mut handles = Vec::new();
    for (id, action) in actions {
        let Some(button) = document.get_element_by_id(id) else {
            continue;
        };
        let weak = weak.clone();
        let handle = ListenerHandle::new(button.as_ref(), "click", move |e: MouseEvent| {
            e.stop_propagation();
            if let Some(lb) = weak.upgrade() {
                action(&lb);
            }
        });
        match handle {
            Ok(h) => handles.push(h),
            Err(e) => log::warn!("could not wire #{id}: {e}"),
        }
    }
    handles
}
