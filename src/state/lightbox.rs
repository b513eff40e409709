// Lightbox navigation over an injected photo collection.
//
// The controller owns open/closed state, the current index and the pan/zoom
// handle. DOM access goes through `ModalHost`, the zoom library through
// `PanZoomProvider`, so neither is assumed to exist globally.

use crate::config::PanZoomOptions;
use crate::error::ViewerError;
use crate::model::Photo;

pub const MODAL_ID: &str = "lightbox-modal";
pub const CONTAINER_ID: &str = "lightbox-image-container";
pub const TITLE_ID: &str = "lightbox-title";
pub const COUNTER_ID: &str = "lightbox-counter";

/// Page-owned modal markup the lightbox writes into.
pub trait ModalHost {
    type Element;

    /// Checks that every anchor element exists. Must not touch the DOM.
    fn verify(&self) -> Result<(), ViewerError>;
    /// Replaces the modal content with the given photo.
    fn show_photo(&mut self, photo: &Photo) -> Result<(), ViewerError>;
    fn set_caption(&mut self, title: &str, counter: &str);
    fn set_visible(&mut self, visible: bool);
    fn clear_content(&mut self);
    /// Element the pan/zoom library should wrap, if content is mounted.
    fn panzoom_target(&self) -> Option<Self::Element>;
}

pub trait PanZoomProvider {
    type Element;
    type Handle;

    fn attach(&self, element: &Self::Element, options: &PanZoomOptions) -> Option<Self::Handle>;
    fn dispose(&self, handle: Self::Handle);
}

pub fn counter_text(index: usize, total: usize) -> String {
    format!("{} / {}", index + 1, total)
}

pub struct LightboxController<H, P>
where
    H: ModalHost,
    P: PanZoomProvider<Element = H::Element>,
{
    photos: Vec<Photo>,
    index: usize,
    open: bool,
    host: H,
    provider: P,
    options: PanZoomOptions,
    panzoom: Option<P::Handle>,
    /// Bumped on every open/navigate/close so a late attach can tell it is stale.
    generation: u64,
}

impl<H, P> LightboxController<H, P>
where
    H: ModalHost,
    P: PanZoomProvider<Element = H::Element>,
{
    pub fn new(photos: Vec<Photo>, host: H, provider: P, options: PanZoomOptions) -> Self {
        Self {
            photos,
            index: 0,
            open: false,
            host,
            provider,
            options,
            panzoom: None,
            generation: 0,
        }
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current(&self) -> Option<&Photo> {
        self.photos.get(self.index)
    }

    /// Shows the photo at `index`. Anchors are checked before anything is mutated.
    pub fn open(&mut self, index: usize) -> Result<(), ViewerError> {
        if self.photos.is_empty() {
            return Err(ViewerError::EmptyCollection);
        }
        if index >= self.photos.len() {
            return Err(ViewerError::IndexOutOfRange {
                index,
                len: self.photos.len(),
            });
        }
        self.host.verify()?;

        self.dispose_panzoom();
        self.generation += 1;
        let photo = &self.photos[index];
        log::debug!(
            "lightbox open #{index} ({})",
            if photo.is_split() { "split" } else { "single" }
        );
        if let Err(e) = self.host.show_photo(photo) {
            // The host may already have torn down the previous photo.
            if self.open {
                self.close();
            } else {
                self.host.clear_content();
            }
            return Err(e);
        }
        self.index = index;
        self.host
            .set_caption(&photo.name, &counter_text(index, self.photos.len()));
        self.host.set_visible(true);
        self.open = true;
        Ok(())
    }

    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.generation += 1;
        self.host.set_visible(false);
        self.dispose_panzoom();
        self.host.clear_content();
        self.open = false;
    }

    /// Moves forward one photo; ignored at the last photo.
    pub fn next(&mut self) -> bool {
        if !self.open || self.index + 1 >= self.photos.len() {
            return false;
        }
        self.navigate(self.index + 1)
    }

    /// Moves back one photo; ignored at the first photo.
    pub fn prev(&mut self) -> bool {
        if !self.open || self.index == 0 {
            return false;
        }
        self.navigate(self.index - 1)
    }

    fn navigate(&mut self, index: usize) -> bool {
        match self.open(index) {
            Ok(()) => true,
            Err(e) => {
                log::error!("lightbox navigation failed: {e}");
                false
            }
        }
    }

    /// Escape closes, arrows navigate. Keys are ignored while closed.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if !self.open {
            return false;
        }
        match key {
            "Escape" => {
                self.close();
                true
            }
            "ArrowRight" => self.next(),
            "ArrowLeft" => self.prev(),
            _ => false,
        }
    }

    /// Generation for which the pan/zoom library still needs attaching, if any.
    pub fn pending_attach(&self) -> Option<u64> {
        let wants = self.open
            && self.panzoom.is_none()
            && self.current().is_some_and(|p| !p.is_split());
        wants.then_some(self.generation)
    }

    /// Attaches the pan/zoom library once layout has settled.
    pub fn attach_panzoom(&mut self, generation: u64) -> bool {
        if self.pending_attach() != Some(generation) {
            return false;
        }
        let Some(target) = self.host.panzoom_target() else {
            log::warn!("pan/zoom target missing");
            return false;
        };
        self.panzoom = self.provider.attach(&target, &self.options);
        self.panzoom.is_some()
    }

    pub fn has_panzoom(&self) -> bool {
        self.panzoom.is_some()
    }

    fn dispose_panzoom(&mut self) {
        if let Some(handle) = self.panzoom.take() {
            self.provider.dispose(handle);
        }
    }
}
