//! Speech synthesis engine adapters.
//!
//! # Available Engines
//!
//! Enable engines via Cargo features:
//! - `piper` - Piper TTS through its command-line executable
//!
//! [`Serialized`] is always available and makes any engine safe to share
//! between threads by allowing one call at a time.

#[cfg(feature = "piper")]
pub mod piper;

use std::sync::{Mutex, MutexGuard};

use crate::audio::WavSink;
use crate::chunk::SynthesisChunk;
use crate::error::EngineError;
use crate::SpeechEngine;

/// Guards an engine that cannot run concurrent inference.
///
/// Calls from different threads queue on an internal mutex.
pub struct Serialized<E> {
    inner: Mutex<E>,
}

impl<E> Serialized<E> {
    pub fn new(engine: E) -> Self {
        Self {
            inner: Mutex::new(engine),
        }
    }

    pub fn into_inner(self) -> Result<E, EngineError> {
        self.inner.into_inner().map_err(|_| poisoned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, E>, EngineError> {
        self.inner.lock().map_err(|_| poisoned())
    }
}

fn poisoned() -> EngineError {
    EngineError::Inference("engine lock poisoned by an earlier panic".to_string())
}

impl<E: SpeechEngine> SpeechEngine for Serialized<E> {
    fn synthesize_wav(&self, text: &str, sink: &mut WavSink<'_>) -> Result<(), EngineError> {
        self.lock()?.synthesize_wav(text, sink)
    }

    fn synthesize_chunks(&self, text: &str) -> Result<Vec<SynthesisChunk>, EngineError> {
        self.lock()?.synthesize_chunks(text)
    }
}
