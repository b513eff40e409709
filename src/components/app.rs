use std::rc::Rc;

use yew::prelude::*;

use super::gallery_grid::GalleryGrid;
use crate::config::ViewerConfig;
use crate::lightbox::Lightbox;
use crate::model::{Photo, parse_photos};

pub const PHOTOS_SCRIPT_ID: &str = "gallery-photos";

#[derive(Properties, PartialEq, Clone)]
pub struct AppProps {
    pub config: Rc<ViewerConfig>,
}

/// Reads the page's embedded photo list; an absent or malformed list yields no photos.
fn read_photos() -> Vec<Photo> {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(PHOTOS_SCRIPT_ID))
        .and_then(|el| el.text_content());
    let Some(raw) = raw else {
        log::warn!("#{PHOTOS_SCRIPT_ID} not found, gallery is empty");
        return Vec::new();
    };
    match parse_photos(&raw) {
        Ok(photos) => {
            log::info!("loaded {} photos", photos.len());
            photos
        }
        Err(e) => {
            log::error!("malformed #{PHOTOS_SCRIPT_ID}: {e}");
            Vec::new()
        }
    }
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let photos = use_memo((), |_| read_photos());
    let lightbox = use_mut_ref(|| None::<Rc<Lightbox>>);

    {
        let lightbox = lightbox.clone();
        let photos = photos.clone();
        let config = props.config.clone();
        use_effect_with((), move |_| {
            match web_sys::window().and_then(|w| w.document()) {
                Some(document) => {
                    *lightbox.borrow_mut() =
                        Some(Lightbox::new((*photos).clone(), document, config));
                }
                None => log::error!("no document, lightbox disabled"),
            }
            move || {
                if let Some(lb) = lightbox.borrow_mut().take() {
                    lb.close();
                }
            }
        });
    }

    let on_open = {
        let lightbox = lightbox.clone();
        Callback::from(move |index: usize| {
            let lb = lightbox.borrow().clone();
            if let Some(lb) = lb {
                lb.open(index);
            }
        })
    };

    html! { <GalleryGrid photos={photos} {on_open} /> }
}
