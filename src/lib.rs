//! # malayalam-tts
//!
//! Turns text into a playable WAV buffer through a neural TTS engine and a
//! chain of post-processing effects.
//!
//! ## Features
//!
//! - **Output normalization**: engines that write a WAV container directly and
//!   engines that only yield raw PCM chunks both end up as the same canonical
//!   RIFF/WAVE buffer
//! - **Effects chain**: pitch shift, speed change, bass/treble shelves, gain
//!   and peak normalization, applied in a fixed order
//! - **Piper**: an adapter for the Piper executable (feature `piper`), as used
//!   with the `ml_IN-arjun-medium` Malayalam voice
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! malayalam-tts = { version = "2026.10", features = ["piper"] }
//! ```
//!
//! ```ignore
//! use std::path::Path;
//! use std::sync::Arc;
//! use malayalam_tts::{engines::piper::PiperEngine, EffectParametersBuilder, TtsPipeline};
//!
//! let engine = PiperEngine::load(Path::new("models/ml_IN-arjun-medium.onnx"))?;
//! let pipeline = TtsPipeline::new(Arc::new(engine));
//!
//! let params = EffectParametersBuilder::default().speed_percent(110).build()?;
//! pipeline.render_to_file("നമസ്കാരം", &params, Path::new("output.wav"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod audio;
pub mod chunk;
pub mod config;
pub mod effects;
pub mod engines;
pub mod error;
pub mod normalizer;
pub mod pipeline;

pub use audio::{EncodedAudio, PcmFormat, WavSink, WaveformBuffer};
pub use chunk::{ChunkMetadata, SynthesisChunk};
pub use config::PipelineConfig;
pub use effects::{EffectParameters, EffectParametersBuilder, EffectsProcessor};
pub use error::{EngineError, Result, TtsError};
pub use pipeline::TtsPipeline;

/// A loaded text-to-speech engine.
///
/// Engines expose up to two output modes. [`synthesize_wav`](Self::synthesize_wav)
/// writes a finished container into a [`WavSink`]; the default reports
/// [`EngineError::Unsupported`]. [`synthesize_chunks`](Self::synthesize_chunks)
/// returns raw PCM chunks and is always required.
///
/// Both methods take `&self`. A handle shared across threads (for example by
/// [`TtsPipeline`]) must tolerate concurrent calls without reloading or
/// mutating the model; engines that cannot should be wrapped in
/// [`engines::Serialized`].
pub trait SpeechEngine {
    /// Synthesize `text` straight into a WAV container.
    fn synthesize_wav(
        &self,
        text: &str,
        sink: &mut WavSink<'_>,
    ) -> std::result::Result<(), EngineError> {
        let _ = (text, sink);
        Err(EngineError::Unsupported)
    }

    /// Synthesize `text` into raw audio chunks, in playback order.
    fn synthesize_chunks(
        &self,
        text: &str,
    ) -> std::result::Result<Vec<SynthesisChunk>, EngineError>;
}
