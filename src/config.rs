// Viewer tuning knobs, optionally overridden from localStorage.

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

pub const CONFIG_STORAGE_KEY: &str = "sv_viewer_config";

/// What a surface resize does to the current view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizePolicy {
    /// Re-run fit-to-screen, discarding any pan/zoom.
    #[default]
    Refit,
    /// Keep the world point at the surface centre fixed and scale with the width change.
    PreserveCenter,
}

/// Options handed to the lightbox's single-image pan/zoom library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanZoomOptions {
    pub min_scale: f64,
    pub max_scale: f64,
    pub contain: String,
}

impl Default for PanZoomOptions {
    fn default() -> Self {
        Self {
            min_scale: 1.0,
            max_scale: 5.0,
            contain: "outside".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Fraction of the surface the fitted content may occupy.
    pub fit_margin: f64,
    pub wheel_zoom_out: f64,
    pub wheel_zoom_in: f64,
    pub button_zoom_in: f64,
    pub button_zoom_out: f64,
    pub resize_policy: ResizePolicy,
    pub panzoom: PanZoomOptions,
    pub settle_delay_ms: i32,
    pub log_level: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 10.0,
            fit_margin: 0.95,
            wheel_zoom_out: 0.9,
            wheel_zoom_in: 1.1,
            button_zoom_in: 1.3,
            button_zoom_out: 0.7,
            resize_policy: ResizePolicy::Refit,
            panzoom: PanZoomOptions::default(),
            settle_delay_ms: 50,
            log_level: "info".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Parses a JSON override. Missing fields keep their defaults; a
    /// min/max pair given in the wrong order is swapped.
    pub fn from_json(raw: &str) -> Result<Self, ViewerError> {
        let mut cfg: ViewerConfig =
            serde_json::from_str(raw).map_err(|e| ViewerError::Config(e.to_string()))?;
        if cfg.min_scale > cfg.max_scale {
            std::mem::swap(&mut cfg.min_scale, &mut cfg.max_scale);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Scale bounds and zoom factors must be finite and positive, and the
    /// fit margin must lie in `(0, 1]`, or the viewport can collapse to zero scale.
    fn validate(&self) -> Result<(), ViewerError> {
        let positive = [
            ("min_scale", self.min_scale),
            ("max_scale", self.max_scale),
            ("wheel_zoom_out", self.wheel_zoom_out),
            ("wheel_zoom_in", self.wheel_zoom_in),
            ("button_zoom_in", self.button_zoom_in),
            ("button_zoom_out", self.button_zoom_out),
            ("panzoom.min_scale", self.panzoom.min_scale),
            ("panzoom.max_scale", self.panzoom.max_scale),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ViewerError::Config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !(self.fit_margin > 0.0 && self.fit_margin <= 1.0) {
            return Err(ViewerError::Config(format!(
                "fit_margin must be in (0, 1], got {}",
                self.fit_margin
            )));
        }
        Ok(())
    }

    /// Reads the override stored under [`CONFIG_STORAGE_KEY`], falling back to defaults.
    pub fn load() -> Self {
        let Some(win) = web_sys::window() else {
            return Self::default();
        };
        let raw = match win.local_storage() {
            Ok(Some(store)) => store.get_item(CONFIG_STORAGE_KEY).ok().flatten(),
            _ => None,
        };
        match raw {
            Some(raw) => Self::from_json(&raw).unwrap_or_else(|e| {
                log::warn!("ignoring {CONFIG_STORAGE_KEY}: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let cfg = ViewerConfig::from_json("{}").unwrap();
        assert_eq!(cfg, ViewerConfig::default());
        assert_eq!(cfg.resize_policy, ResizePolicy::Refit);
        assert_eq!(cfg.panzoom.contain, "outside");
    }

    #[test]
    fn partial_override_keeps_other_fields() {
        let cfg =
            ViewerConfig::from_json(r#"{"max_scale": 4.0, "resize_policy": "preserve_center"}"#)
                .unwrap();
        assert_eq!(cfg.max_scale, 4.0);
        assert_eq!(cfg.min_scale, 0.1);
        assert_eq!(cfg.resize_policy, ResizePolicy::PreserveCenter);
        assert_eq!(cfg.settle_delay_ms, 50);
    }

    #[test]
    fn inverted_scale_bounds_are_swapped() {
        let cfg = ViewerConfig::from_json(r#"{"min_scale": 8.0, "max_scale": 2.0}"#).unwrap();
        assert_eq!((cfg.min_scale, cfg.max_scale), (2.0, 8.0));
    }

    #[test]
    fn non_positive_scale_bounds_are_rejected() {
        for raw in [
            r#"{"min_scale": 0, "fit_margin": 0.5}"#,
            r#"{"min_scale": -5}"#,
            r#"{"min_scale": -5, "max_scale": -1}"#,
        ] {
            assert!(
                matches!(ViewerConfig::from_json(raw), Err(ViewerError::Config(_))),
                "{raw} accepted"
            );
        }
    }

    #[test]
    fn fit_margin_must_be_a_fraction() {
        for margin in ["0", "-1", "1.5"] {
            let raw = format!(r#"{{"fit_margin": {margin}}}"#);
            assert!(ViewerConfig::from_json(&raw).is_err(), "fit_margin {margin} accepted");
        }
        let cfg = ViewerConfig::from_json(r#"{"fit_margin": 1.0}"#).unwrap();
        assert_eq!(cfg.fit_margin, 1.0);
    }

    #[test]
    fn zoom_factors_must_be_positive() {
        for field in ["wheel_zoom_out", "wheel_zoom_in", "button_zoom_in", "button_zoom_out"] {
            let raw = format!(r#"{{"{field}": 0}}"#);
            assert!(ViewerConfig::from_json(&raw).is_err(), "{field} = 0 accepted");
        }
        assert!(ViewerConfig::from_json(r#"{"panzoom": {"min_scale": -1}}"#).is_err());
    }

    #[test]
    fn accepted_overrides_keep_the_viewport_in_bounds() {
        use crate::state::{DeviceSurface, ViewerCore};

        let cfg = ViewerConfig::from_json(r#"{"min_scale": 0.5, "max_scale": 2.0, "fit_margin": 0.25}"#)
            .unwrap();
        let mut core = ViewerCore::new(&cfg);
        core.resize(DeviceSurface::new(1000.0, 800.0));
        assert!(core.content_loaded((1200.0, 800.0)));
        assert_eq!(core.viewport().scale, 0.5);
        for _ in 0..10 {
            core.zoom_out();
        }
        let vp = core.viewport();
        assert_eq!(vp.scale, 0.5);
        assert!(vp.offset_x.is_finite() && vp.offset_y.is_finite());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ViewerConfig::from_json("{not json").is_err());
    }

    #[test]
    fn log_level_parsing_falls_back_to_info() {
        let mut cfg = ViewerConfig::default();
        cfg.log_level = "debug".into();
        assert_eq!(cfg.level_filter(), log::LevelFilter::Debug);
        cfg.log_level = "chatty".into();
        assert_eq!(cfg.level_filter(), log::LevelFilter::Info);
    }
}
