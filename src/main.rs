use std::rc::Rc;

mod components;
mod config;
mod error;
mod harden;
mod lightbox;
mod loader;
mod model;
mod render;
mod state;
mod util;

use components::app::{App, AppProps};
use config::ViewerConfig;

const ROOT_ID: &str = "gallery";

fn main() {
    // Installed before the config is read so its load warnings are not lost.
    util::init_logging(log::LevelFilter::Info);
    let config = ViewerConfig::load();
    log::set_max_level(config.level_filter());

    let props = AppProps {
        config: Rc::new(config),
    };
    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(ROOT_ID));
    match root {
        Some(root) => {
            yew::Renderer::<App>::with_root_and_props(root, props).render();
        }
        None => {
            log::warn!("#{ROOT_ID} not found, mounting gallery on body");
            yew::Renderer::<App>::with_props(props).render();
        }
    }
}
