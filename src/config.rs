use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::STANDARD_SAMPLE_RATE;
use crate::error::{Result, TtsError};

/// Tunables of the effects chain.
///
/// Loadable from JSON; absent keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rate every pitch/speed change is resampled back to.
    pub standard_sample_rate: u32,
    pub bass_cutoff_hz: f64,
    pub treble_cutoff_hz: f64,
    /// Distance of the normalized peak below full scale.
    pub normalize_headroom_db: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            standard_sample_rate: STANDARD_SAMPLE_RATE,
            bass_cutoff_hz: 200.0,
            treble_cutoff_hz: 3000.0,
            normalize_headroom_db: 0.1,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading pipeline config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| TtsError::validation("config", format!("failed to parse JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.standard_sample_rate == 0 {
            return Err(TtsError::validation("standard_sample_rate", "must be positive"));
        }
        for (name, cutoff) in [
            ("bass_cutoff_hz", self.bass_cutoff_hz),
            ("treble_cutoff_hz", self.treble_cutoff_hz),
        ] {
            if !(cutoff.is_finite() && cutoff > 0.0) {
                return Err(TtsError::validation(name, format!("must be positive, got {cutoff}")));
            }
        }
        if !(self.normalize_headroom_db.is_finite() && self.normalize_headroom_db >= 0.0) {
            return Err(TtsError::validation(
                "normalize_headroom_db",
                format!("must be non-negative, got {}", self.normalize_headroom_db),
            ));
        }
        Ok(())
    }
}
