use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::engine::PiperError;

/// The subset of a Piper voice's `.onnx.json` this crate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    pub audio: AudioConfig,
    #[serde(default = "default_num_speakers")]
    pub num_speakers: u32,
    #[serde(default)]
    pub speaker_id_map: BTreeMap<String, u32>,
    #[serde(default)]
    pub language: Option<LanguageConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    #[serde(default)]
    pub quality: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageConfig {
    pub code: String,
}

fn default_num_speakers() -> u32 {
    1
}

/// Piper keeps the voice config next to the model as `<model>.json`.
pub fn config_path_for(model_path: &Path) -> PathBuf {
    let mut path = model_path.as_os_str().to_owned();
    path.push(".json");
    PathBuf::from(path)
}

pub fn load_voice_config(config_path: &Path) -> Result<VoiceConfig, PiperError> {
    let content = std::fs::read_to_string(config_path)?;
    parse_voice_config(&content).map_err(|message| PiperError::Config {
        path: config_path.to_path_buf(),
        message,
    })
}

fn parse_voice_config(content: &str) -> Result<VoiceConfig, String> {
    let config: VoiceConfig =
        serde_json::from_str(content).map_err(|e| format!("Failed to parse JSON: {e}"))?;
    if config.audio.sample_rate == 0 {
        return Err("audio.sample_rate must be positive".to_string());
    }
    Ok(config)
}
