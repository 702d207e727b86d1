//! Piper text-to-speech engine adapter.
//!
//! Drives the `piper` executable with a voice model such as
//! `ml_IN-arjun-medium.onnx`. Text is fed on stdin and raw 16-bit PCM is read
//! from stdout (`--output-raw`); the sample rate comes from the voice's
//! `.onnx.json` config.
//!
//! # System Requirements
//!
//! **piper** must be installed and on PATH (or passed via
//! [`PiperModelParams::bin_path`]):
//! - Releases: <https://github.com/rhasspy/piper/releases>
//! - Python: `pip install piper-tts`
//!
//! # Model Directory Layout
//!
//! ```text
//! models/
//! ├── ml_IN-arjun-medium.onnx        # voice model
//! └── ml_IN-arjun-medium.onnx.json   # voice config (sample rate, speakers)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use malayalam_tts::engines::piper::{PiperEngine, PiperModelParams};
//! use malayalam_tts::{EffectParameters, TtsPipeline};
//! use std::path::{Path, PathBuf};
//! use std::sync::Arc;
//!
//! let params = PiperModelParams {
//!     bin_path: Some(PathBuf::from("/opt/piper/piper")),
//!     ..Default::default()
//! };
//! let engine = PiperEngine::load_with_params(Path::new("models/ml_IN-arjun-medium.onnx"), params)?;
//! let pipeline = TtsPipeline::new(Arc::new(engine));
//! let wav = pipeline.render("നമസ്കാരം", &EffectParameters::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod engine;

pub use config::VoiceConfig;
pub use engine::{PiperEngine, PiperError, PiperModelParams};
