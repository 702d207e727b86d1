//! Turns whatever an engine emits into one canonical WAV buffer.

use crate::audio::{EncodedAudio, WavSink, WaveformBuffer, WAV_HEADER_LEN};
use crate::chunk::SynthesisChunk;
use crate::error::{EngineError, Result, TtsError};
use crate::SpeechEngine;

/// Synthesize `text` into canonical [`EncodedAudio`].
///
/// Tries the engine's direct-container mode first and falls back to its
/// raw-chunk mode when the engine reports an [`EngineError`] or writes no
/// samples. Errors from the raw-chunk mode are returned as
/// [`TtsError::Synthesis`].
pub fn synthesize<E>(engine: &E, text: &str) -> Result<EncodedAudio>
where
    E: SpeechEngine + ?Sized,
{
    if text.trim().is_empty() {
        return Err(TtsError::synthesis("text is empty"));
    }

    match synthesize_direct(engine, text) {
        Ok(Some(audio)) => return Ok(audio),
        Ok(None) => {
            log::debug!("Direct container synthesis produced no samples, using raw chunks")
        }
        Err(EngineError::Unsupported) => {
            log::debug!("Engine has no direct container mode, using raw chunks")
        }
        Err(e) => log::warn!("Direct container synthesis failed ({e}), using raw chunks"),
    }

    let chunks = engine
        .synthesize_chunks(text)
        .map_err(|e| TtsError::engine("raw-chunk synthesis failed", e))?;
    assemble_chunks(&chunks)
}

/// `Ok(None)` means the engine ran but the container holds no audio.
fn synthesize_direct<E>(
    engine: &E,
    text: &str,
) -> std::result::Result<Option<EncodedAudio>, EngineError>
where
    E: SpeechEngine + ?Sized,
{
    let mut buffer = Vec::new();
    let frames = {
        let mut sink = WavSink::new(&mut buffer);
        engine.synthesize_wav(text, &mut sink)?;
        sink.finish()?
    };

    if frames == 0 || buffer.len() <= WAV_HEADER_LEN {
        return Ok(None);
    }
    log::debug!("Direct container synthesis wrote {frames} frames");
    Ok(Some(EncodedAudio::from_bytes(buffer)))
}

/// Concatenate chunk payloads in order, using the first chunk's format.
pub fn assemble_chunks(chunks: &[SynthesisChunk]) -> Result<EncodedAudio> {
    let first = chunks
        .first()
        .ok_or_else(|| TtsError::synthesis("engine produced no audio chunks"))?;
    let format = first.format()?;

    let mut raw = Vec::new();
    for chunk in chunks {
        raw.extend_from_slice(&chunk.payload());
    }
    if raw.is_empty() {
        return Err(TtsError::synthesis("engine produced only empty audio chunks"));
    }

    log::debug!(
        "Assembled {} chunks into {} bytes ({} Hz, {} ch, {} bytes/sample)",
        chunks.len(),
        raw.len(),
        format.sample_rate,
        format.channels,
        format.sample_width
    );

    let waveform = WaveformBuffer::from_pcm_bytes(format, &raw)
        .map_err(|e| TtsError::synthesis(format!("chunk audio does not match its format: {e}")))?;
    EncodedAudio::encode(&waveform)
}
