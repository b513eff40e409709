use std::rc::Rc;

use yew::prelude::*;

use crate::model::Photo;

#[derive(Properties, PartialEq, Clone)]
pub struct GalleryGridProps {
    pub photos: Rc<Vec<Photo>>,
    pub on_open: Callback<usize>,
}

#[function_component(GalleryGrid)]
pub fn gallery_grid(props: &GalleryGridProps) -> Html {
    if props.photos.is_empty() {
        return html! { <div class="gallery-empty" style="opacity:0.7;">{"No photos."}</div> };
    }
    html! {<div class="gallery-grid" style="display:grid; grid-template-columns:repeat(auto-fill, minmax(220px, 1fr)); gap:12px;">
        { for props.photos.iter().enumerate().map(|(i, photo)| {
            let onclick = {
                let cb = props.on_open.clone();
                Callback::from(move |_| cb.emit(i))
            };
            let badge = if photo.is_split() { "stitched" } else { "" };
            html! {
                <figure class="gallery-item" key={i} {onclick} style="margin:0; cursor:zoom-in;">
                    <img src={photo.thumbnail_src().to_string()} alt={photo.name.clone()} loading="lazy" draggable="false"
                        style="width:100%; aspect-ratio:4/3; object-fit:cover; border-radius:6px;" />
                    <figcaption style="display:flex; justify-content:space-between; font-size:13px; padding-top:4px;">
                        <span>{ photo.name.clone() }</span>
                        <span style="opacity:0.6;">{ badge }</span>
                    </figcaption>
                </figure>
            }
        }) }
    </div>}
}
