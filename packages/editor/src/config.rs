use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for the floating layer and autosave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Snap grid for drags and moves, in canvas pixels
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,

    /// Whether pointer drags snap unless the modifier is held
    #[serde(default = "default_true")]
    pub snap_to_grid: bool,

    /// Offset applied to both axes when duplicating
    #[serde(default = "default_duplicate_offset")]
    pub duplicate_offset: f64,

    #[serde(default = "default_nudge_step")]
    pub nudge_step: f64,

    /// Nudge step while shift is held
    #[serde(default = "default_nudge_step_large")]
    pub nudge_step_large: f64,

    /// Inactivity before an autosave fires
    #[serde(default = "default_autosave_debounce_ms")]
    pub autosave_debounce_ms: u64,
}

fn default_grid_size() -> f64 {
    8.0
}

fn default_true() -> bool {
    true
}

fn default_duplicate_offset() -> f64 {
    20.0
}

fn default_nudge_step() -> f64 {
    1.0
}

fn default_nudge_step_large() -> f64 {
    10.0
}

fn default_autosave_debounce_ms() -> u64 {
    1500
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            snap_to_grid: true,
            duplicate_offset: default_duplicate_offset(),
            nudge_step: default_nudge_step(),
            nudge_step_large: default_nudge_step_large(),
            autosave_debounce_ms: default_autosave_debounce_ms(),
        }
    }
}

impl EditorConfig {
    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}
