use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
    #[error("failed to load image {source_url}")]
    Load { source_url: String },

    #[error("required element #{id} not found in DOM")]
    MissingElement { id: String },

    #[error("canvas export disabled")]
    ExportDisabled,

    #[error("photo collection is empty")]
    EmptyCollection,

    #[error("photo index {index} out of range, collection has {len} photos")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid viewer config: {0}")]
    Config(String),

    #[error("web api error: {0}")]
    Js(String),
}

impl ViewerError {
    pub fn missing(id: &str) -> Self {
        Self::MissingElement { id: id.to_string() }
    }
}

impl From<JsValue> for ViewerError {
    fn from(value: JsValue) -> Self {
        let msg = value.as_string().unwrap_or_else(|| format!("{value:?}"));
        Self::Js(msg)
    }
}
