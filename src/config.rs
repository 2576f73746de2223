use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Tunables of the editing core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Pick radius in orthographic viewports, in viewport world units.
    pub pick_radius: f64,
    /// Pick radius in the perspective viewport, in pixels.
    pub screen_pick_radius: f64,
    /// Grid-snap step.
    pub grid_size: f64,
    /// Net drag displacement below which no "vertices moved" change is recorded.
    pub drag_epsilon: f64,
    /// World units per pixel of vertical travel for axis-locked perspective drags.
    pub axis_drag_sensitivity: f64,
    /// Maximum number of history entries kept; `None` keeps everything.
    pub history_limit: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            pick_radius: 8.0,
            screen_pick_radius: 8.0,
            grid_size: 50.0,
            drag_epsilon: 1e-6,
            axis_drag_sensitivity: 1.0,
            history_limit: None,
        }
    }
}

impl EditorConfig {
    /// Parses and validates a config from JSON. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns a JSON error for malformed text or a [`ConfigError`] for
    /// out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, otherwise as
    /// [`EditorConfig::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks every field's range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let positive = [
            ("pick_radius", self.pick_radius),
            ("screen_pick_radius", self.screen_pick_radius),
            ("grid_size", self.grid_size),
            ("axis_drag_sensitivity", self.axis_drag_sensitivity),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        if !(self.drag_epsilon.is_finite() && self.drag_epsilon >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "drag_epsilon",
                reason: format!("must be non-negative, got {}", self.drag_epsilon),
            });
        }
        if self.history_limit == Some(0) {
            return Err(ConfigError::Invalid {
                field: "history_limit",
                reason: "must keep at least one entry".into(),
            });
        }
        Ok(())
    }
}
