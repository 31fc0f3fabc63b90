use farmjob_core::ConversionCfg;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerCfg {
    pub conversion: ConversionCfg,
    /// Side of the square thumbnails are projected into, in pixels.
    pub overlay_size: f64,
    pub overlay_padding: f64,
}

impl Default for LedgerCfg {
    fn default() -> Self {
        Self {
            conversion: ConversionCfg::default(),
            overlay_size: 96.0,
            overlay_padding: 4.0,
        }
    }
}
