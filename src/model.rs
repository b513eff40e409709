// Photo records as published by the page, and the decoded image pair the
// canvas viewer paints.

use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhotoDisplay {
    /// Two halves shown side by side in the canvas stitch viewer.
    Split { src_a: String, src_b: String },
    /// One image shown with the pan/zoom library.
    Single { src: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawPhoto")]
pub struct Photo {
    pub name: String,
    pub display: PhotoDisplay,
}

impl Photo {
    pub fn single(name: &str, src: &str) -> Self {
        Self {
            name: name.to_string(),
            display: PhotoDisplay::Single {
                src: src.to_string(),
            },
        }
    }

    pub fn split(name: &str, src_a: &str, src_b: &str) -> Self {
        Self {
            name: name.to_string(),
            display: PhotoDisplay::Split {
                src_a: src_a.to_string(),
                src_b: src_b.to_string(),
            },
        }
    }

    /// Image used for the gallery grid tile.
    pub fn thumbnail_src(&self) -> &str {
        match &self.display {
            PhotoDisplay::Split { src_a, .. } => src_a,
            PhotoDisplay::Single { src } => src,
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self.display, PhotoDisplay::Split { .. })
    }
}

/// Wire shape: `{"type": "split"|"single", "src"?, "src_a"?, "src_b"?, "name"}`.
#[derive(Deserialize)]
struct RawPhoto {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    src: Option<String>,
    #[serde(default)]
    src_a: Option<String>,
    #[serde(default)]
    src_b: Option<String>,
    #[serde(default)]
    name: String,
}

impl TryFrom<RawPhoto> for Photo {
    type Error = String;

    fn try_from(raw: RawPhoto) -> Result<Self, Self::Error> {
        // A split record missing either half degrades to single mode.
        let display = match (raw.kind.as_str(), raw.src_a, raw.src_b, raw.src) {
            ("split", Some(src_a), Some(src_b), _) if !src_a.is_empty() && !src_b.is_empty() => {
                PhotoDisplay::Split { src_a, src_b }
            }
            (_, _, _, Some(src)) if !src.is_empty() => PhotoDisplay::Single { src },
            _ => return Err(format!("photo {:?} has no usable image source", raw.name)),
        };
        Ok(Photo {
            name: raw.name,
            display,
        })
    }
}

/// Parses the page's photo list.
pub fn parse_photos(raw: &str) -> Result<Vec<Photo>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Two decoded images placed side by side; immutable once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct ImagePair<I> {
    pub image_a: I,
    pub image_b: I,
    pub width_a: f64,
    pub height_a: f64,
    pub width_b: f64,
    pub height_b: f64,
}

impl<I> ImagePair<I> {
    /// Combined content size; both halves share the height of image A.
    pub fn combined_size(&self) -> (f64, f64) {
        (self.width_a + self.width_b, self.height_a)
    }

    /// Horizontal position where image B starts.
    pub fn seam_x(&self) -> f64 {
        self.width_a
    }
}
