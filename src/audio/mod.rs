//! Canonical waveform representation and its RIFF/WAVE container.

mod container;
mod waveform;

pub use container::{EncodedAudio, WavSink, WAV_HEADER_LEN};
pub use waveform::{FormatError, PcmFormat, WaveformBuffer, STANDARD_SAMPLE_RATE};
