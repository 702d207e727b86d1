//! Error types shared by the normalizer, the effects chain and the engines.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TtsError>;

/// Failure reported by a [`SpeechEngine`](crate::SpeechEngine) implementation.
///
/// These are the only failures the direct-container attempt is allowed to
/// absorb before falling back to raw-chunk synthesis.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("engine does not support this synthesis mode")]
    Unsupported,
    #[error("engine inference failed: {0}")]
    Inference(String),
    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("container sink rejected audio: {0}")]
    Sink(String),
}

#[derive(thiserror::Error, Debug)]
pub enum TtsError {
    #[error("invalid parameter '{name}': {message}")]
    Validation { name: String, message: String },

    #[error("synthesis failed: {message}")]
    Synthesis {
        message: String,
        #[source]
        source: Option<EngineError>,
    },

    #[error("malformed waveform container: {0}")]
    Decode(String),

    #[error("failed to encode waveform: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TtsError {
    pub fn validation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::Synthesis {
            message: message.into(),
            source: None,
        }
    }

    /// Synthesis failure caused by the engine itself.
    pub fn engine(message: impl Into<String>, source: EngineError) -> Self {
        Self::Synthesis {
            message: message.into(),
            source: Some(source),
        }
    }
}
