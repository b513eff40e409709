use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlImageElement;

use crate::error::ViewerError;
use crate::model::ImagePair;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BarrierEvent {
    /// One image is still outstanding.
    Pending,
    /// Both images decoded; reported once.
    Ready,
    /// First failure; reported once, later events are ignored.
    Failed(ViewerError),
    /// The barrier already settled.
    Ignored,
}

/// Resolves only when both slots have loaded, or fails on the first error.
#[derive(Debug, Clone)]
pub struct PairBarrier {
    sources: [String; 2],
    loaded: [bool; 2],
    settled: bool,
}

impl PairBarrier {
    pub fn new(src_a: &str, src_b: &str) -> Self {
        Self {
            sources: [src_a.to_string(), src_b.to_string()],
            loaded: [false; 2],
            settled: false,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn source(&self, slot: Slot) -> &str {
        &self.sources[slot.index()]
    }

    pub fn loaded(&mut self, slot: Slot) -> BarrierEvent {
        if self.settled {
            return BarrierEvent::Ignored;
        }
        self.loaded[slot.index()] = true;
        if self.loaded.iter().all(|l| *l) {
            self.settled = true;
            BarrierEvent::Ready
        } else {
            BarrierEvent::Pending
        }
    }

    pub fn failed(&mut self, slot: Slot) -> BarrierEvent {
        if self.settled {
            return BarrierEvent::Ignored;
        }
        self.settled = true;
        BarrierEvent::Failed(ViewerError::Load {
            source_url: self.source(slot).to_string(),
        })
    }
}

pub type LoadResult = Result<ImagePair<HtmlImageElement>, ViewerError>;

struct LoadShared {
    barrier: RefCell<PairBarrier>,
    images: [HtmlImageElement; 2],
    on_done: RefCell<Option<Box<dyn FnOnce(LoadResult)>>>,
}

impl LoadShared {
    fn settle(&self, event: BarrierEvent) {
        let result = match event {
            BarrierEvent::Ready => {
                let [a, b] = &self.images;
                Ok(ImagePair {
                    image_a: a.clone(),
                    image_b: b.clone(),
                    width_a: a.natural_width() as f64,
                    height_a: a.natural_height() as f64,
                    width_b: b.natural_width() as f64,
                    height_b: b.natural_height() as f64,
                })
            }
            BarrierEvent::Failed(e) => Err(e),
            BarrierEvent::Pending | BarrierEvent::Ignored => return,
        };
        let callback = self.on_done.borrow_mut().take();
        if let Some(cb) = callback {
            cb(result);
        }
    }
}

/// In-flight pair load. Dropping it detaches the image handlers, so a
/// completion that arrives afterwards is never reported.
pub struct PendingPair {
    shared: Rc<LoadShared>,
    _handlers: Vec<Closure<dyn FnMut()>>,
}

impl Drop for PendingPair {
    fn drop(&mut self) {
        for img in &self.shared.images {
            img.set_onload(None);
            img.set_onerror(None);
        }
        self.shared.on_done.borrow_mut().take();
    }
}

/// Starts loading both images; `on_done` fires exactly once.
///
/// `on_done` must not drop the returned [`PendingPair`] synchronously.
pub fn load_pair(
    src_a: &str,
    src_b: &str,
    on_done: impl FnOnce(LoadResult) + 'static,
) -> Result<PendingPair, ViewerError> {
    let shared = Rc::new(LoadShared {
        barrier: RefCell::new(PairBarrier::new(src_a, src_b)),
        images: [HtmlImageElement::new()?, HtmlImageElement::new()?],
        on_done: RefCell::new(Some(Box::new(on_done))),
    });

    let mut handlers = Vec::with_capacity(4);
    for slot in [Slot::A, Slot::B] {
        let img = &shared.images[slot.index()];
        let onload = {
            let shared = shared.clone();
            Closure::wrap(Box::new(move || {
                let event = shared.barrier.borrow_mut().loaded(slot);
                shared.settle(event);
            }) as Box<dyn FnMut()>)
        };
        let onerror = {
            let shared = shared.clone();
            Closure::wrap(Box::new(move || {
                let event = shared.barrier.borrow_mut().failed(slot);
                shared.settle(event);
            }) as Box<dyn FnMut()>)
        };
        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        handlers.push(onload);
        handlers.push(onerror);
    }

    shared.images[0].set_src(src_a);
    shared.images[1].set_src(src_b);
    log::debug!("loading image pair {src_a} + {src_b}");

    Ok(PendingPair {
        shared,
        _handlers: handlers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_only_after_both_slots_load() {
        let mut barrier = PairBarrier::new("a.jpg", "b.jpg");
        assert_eq!(barrier.loaded(Slot::B), BarrierEvent::Pending);
        assert!(!barrier.is_settled());
        assert_eq!(barrier.loaded(Slot::A), BarrierEvent::Ready);
        assert!(barrier.is_settled());
    }

    #[test]
    fn duplicate_load_of_same_slot_stays_pending() {
        let mut barrier = PairBarrier::new("a.jpg", "b.jpg");
        assert_eq!(barrier.loaded(Slot::A), BarrierEvent::Pending);
        assert_eq!(barrier.loaded(Slot::A), BarrierEvent::Pending);
        assert_eq!(barrier.loaded(Slot::B), BarrierEvent::Ready);
    }

    #[test]
    fn first_failure_names_its_source_and_is_terminal() {
        let mut barrier = PairBarrier::new("a.jpg", "broken.jpg");
        assert_eq!(barrier.loaded(Slot::A), BarrierEvent::Pending);
        assert_eq!(
            barrier.failed(Slot::B),
            BarrierEvent::Failed(ViewerError::Load {
                source_url: "broken.jpg".into()
            })
        );
        assert_eq!(barrier.loaded(Slot::B), BarrierEvent::Ignored);
        assert_eq!(barrier.failed(Slot::A), BarrierEvent::Ignored);
    }

    #[test]
    fn no_ready_after_failure() {
        let mut barrier = PairBarrier::new("a.jpg", "b.jpg");
        assert!(matches!(barrier.failed(Slot::A), BarrierEvent::Failed(_)));
        assert_eq!(barrier.loaded(Slot::A), BarrierEvent::Ignored);
        assert_eq!(barrier.loaded(Slot::B), BarrierEvent::Ignored);
    }
}
