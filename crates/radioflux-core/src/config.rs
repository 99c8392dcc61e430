use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_FOREGROUND_REGION;

/// Options for a batch flux measurement, loadable from TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluxConfig {
    /// Foreground region: a region file path or literal region text.
    pub foreground: String,
    /// Optional background region, used for the noise estimate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Measure each include shape of the foreground separately.
    pub individual: bool,
    /// Subtract the background-region mean before summing.
    pub subtract_background: bool,
    /// Log and skip files that fail instead of stopping the batch.
    pub keep_going: bool,
}

impl Default for FluxConfig {
    fn default() -> Self {
        Self {
            foreground: DEFAULT_FOREGROUND_REGION.to_string(),
            background: None,
            individual: false,
            subtract_background: false,
            keep_going: false,
        }
    }
}
