use std::io::Cursor;
use std::path::Path;

use crate::error::{EngineError, Result, TtsError};

use super::waveform::{PcmFormat, WaveformBuffer};

/// Size of a plain PCM RIFF/WAVE header (RIFF + `fmt ` + `data` chunk headers).
pub const WAV_HEADER_LEN: usize = 44;

fn wav_spec(format: PcmFormat) -> hound::WavSpec {
    hound::WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample(),
        sample_format: hound::SampleFormat::Int,
    }
}

/// Audio serialized in the canonical RIFF/WAVE integer-PCM container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAudio {
    bytes: Vec<u8>,
}

impl EncodedAudio {
    /// Wrap container bytes without inspecting them. [`decode`](Self::decode)
    /// is where malformed input is rejected.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Serialize a waveform into a fresh container.
    pub fn encode(waveform: &WaveformBuffer) -> Result<Self> {
        let format = waveform.format();
        let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + waveform.samples().len() * 4);
        {
            let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), wav_spec(format))
                .map_err(|e| TtsError::Encode(e.to_string()))?;
            for &sample in waveform.samples() {
                writer
                    .write_sample(sample)
                    .map_err(|e| TtsError::Encode(e.to_string()))?;
            }
            writer
                .finalize()
                .map_err(|e| TtsError::Encode(e.to_string()))?;
        }
        Ok(Self { bytes })
    }

    /// Parse the container back into a waveform.
    ///
    /// Only integer PCM at 8, 16, 24 or 32 bits is accepted.
    pub fn decode(&self) -> Result<WaveformBuffer> {
        let reader = hound::WavReader::new(Cursor::new(self.bytes.as_slice()))
            .map_err(|e| TtsError::Decode(e.to_string()))?;
        let spec = reader.spec();

        if spec.sample_format != hound::SampleFormat::Int {
            return Err(TtsError::Decode(
                "floating-point samples are not supported".to_string(),
            ));
        }
        if spec.bits_per_sample % 8 != 0 {
            return Err(TtsError::Decode(format!(
                "unsupported bit depth: {}",
                spec.bits_per_sample
            )));
        }

        let format = PcmFormat::new(spec.sample_rate, spec.channels, spec.bits_per_sample / 8)
            .map_err(|e| TtsError::Decode(e.to_string()))?;
        let samples = reader
            .into_samples::<i32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TtsError::Decode(e.to_string()))?;

        WaveformBuffer::new(format, samples).map_err(|e| TtsError::Decode(e.to_string()))
    }

    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

impl AsRef<[u8]> for EncodedAudio {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

enum SinkState<'a> {
    Pending(&'a mut Vec<u8>),
    Writing {
        writer: hound::WavWriter<Cursor<&'a mut Vec<u8>>>,
        format: PcmFormat,
    },
    Closed,
}

/// In-memory WAV writer handed to engines that can emit a container directly.
///
/// The engine declares the stream format once with [`configure`](Self::configure)
/// and then appends little-endian PCM with [`write_frames`](Self::write_frames).
pub struct WavSink<'a> {
    state: SinkState<'a>,
    frames: usize,
}

impl<'a> WavSink<'a> {
    pub fn new(buffer: &'a mut Vec<u8>) -> Self {
        Self {
            state: SinkState::Pending(buffer),
            frames: 0,
        }
    }

    pub fn configure(&mut self, format: PcmFormat) -> std::result::Result<(), EngineError> {
        format
            .check()
            .map_err(|e| EngineError::Sink(e.to_string()))?;

        match std::mem::replace(&mut self.state, SinkState::Closed) {
            SinkState::Pending(buffer) => {
                let writer = hound::WavWriter::new(Cursor::new(buffer), wav_spec(format))
                    .map_err(|e| EngineError::Sink(e.to_string()))?;
                self.state = SinkState::Writing { writer, format };
                Ok(())
            }
            other => {
                self.state = other;
                Err(EngineError::Sink("format already configured".to_string()))
            }
        }
    }

    pub fn format(&self) -> Option<PcmFormat> {
        match &self.state {
            SinkState::Writing { format, .. } => Some(*format),
            _ => None,
        }
    }

    /// Append raw PCM frames in the configured format.
    pub fn write_frames(&mut self, pcm: &[u8]) -> std::result::Result<(), EngineError> {
        let SinkState::Writing { writer, format } = &mut self.state else {
            return Err(EngineError::Sink(
                "format must be configured before writing frames".to_string(),
            ));
        };

        let frames = WaveformBuffer::from_pcm_bytes(*format, pcm)
            .map_err(|e| EngineError::Sink(e.to_string()))?;
        for &sample in frames.samples() {
            writer
                .write_sample(sample)
                .map_err(|e| EngineError::Sink(e.to_string()))?;
        }
        self.frames += frames.frame_count();
        Ok(())
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }

    /// Flush the header and return the number of frames written.
    pub(crate) fn finish(self) -> std::result::Result<usize, EngineError> {
        match self.state {
            SinkState::Writing { writer, .. } => {
                writer
                    .finalize()
                    .map_err(|e| EngineError::Sink(e.to_string()))?;
                Ok(self.frames)
            }
            SinkState::Pending(_) | SinkState::Closed => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(format: PcmFormat, frames: usize) -> WaveformBuffer {
        let (_, max) = format.sample_bounds();
        let samples = (0..frames * format.channels as usize)
            .map(|i| ((i as f64 * 0.3).sin() * max as f64 * 0.5) as i32)
            .collect();
        WaveformBuffer::new(format, samples).unwrap()
    }

    #[test]
    fn mono_sixteen_bit_has_plain_header() {
        let waveform = tone(PcmFormat::default(), 10);
        let encoded = EncodedAudio::encode(&waveform).unwrap();
        assert_eq!(encoded.len(), WAV_HEADER_LEN + 20);
        assert_eq!(&encoded.as_bytes()[..4], b"RIFF");
        assert_eq!(&encoded.as_bytes()[8..12], b"WAVE");
    }

    #[test]
    fn decode_restores_format_and_samples() {
        for (rate, channels, width) in [(8000, 1, 1), (22050, 2, 2), (48000, 1, 3), (16000, 2, 4)] {
            let format = PcmFormat::new(rate, channels, width).unwrap();
            let waveform = tone(format, 32);
            let decoded = EncodedAudio::encode(&waveform).unwrap().decode().unwrap();
            assert_eq!(decoded, waveform, "{rate}/{channels}/{width}");
        }
    }

    #[test]
    fn reencoding_is_byte_identical() {
        let format = PcmFormat::new(22050, 1, 2).unwrap();
        let encoded = EncodedAudio::encode(&tone(format, 100)).unwrap();
        let again = EncodedAudio::encode(&encoded.decode().unwrap()).unwrap();
        assert_eq!(again, encoded);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = EncodedAudio::from_bytes(b"definitely not a wav file".to_vec())
            .decode()
            .unwrap_err();
        assert!(matches!(err, TtsError::Decode(_)));

        let err = EncodedAudio::from_bytes(Vec::new()).decode().unwrap_err();
        assert!(matches!(err, TtsError::Decode(_)));
    }

    #[test]
    fn float_containers_are_rejected() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 24000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut bytes = Vec::new();
        {
            let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
            writer.write_sample(0.25f32).unwrap();
            writer.finalize().unwrap();
        }
        let err = EncodedAudio::from_bytes(bytes).decode().unwrap_err();
        assert!(matches!(err, TtsError::Decode(_)));
    }

    #[test]
    fn sink_writes_a_decodable_container() {
        let mut bytes = Vec::new();
        let mut sink = WavSink::new(&mut bytes);
        sink.configure(PcmFormat::new(22050, 1, 2).unwrap()).unwrap();
        sink.write_frames(&[0x01, 0x00, 0xff, 0xff]).unwrap();
        sink.write_frames(&[0x10, 0x00]).unwrap();
        assert_eq!(sink.frames_written(), 3);
        assert_eq!(sink.finish().unwrap(), 3);

        let decoded = EncodedAudio::from_bytes(bytes).decode().unwrap();
        assert_eq!(decoded.sample_rate(), 22050);
        assert_eq!(decoded.samples(), &[1, -1, 16]);
    }

    #[test]
    fn sink_requires_format_first() {
        let mut bytes = Vec::new();
        let mut sink = WavSink::new(&mut bytes);
        assert!(matches!(
            sink.write_frames(&[0, 0]),
            Err(EngineError::Sink(_))
        ));
        assert_eq!(sink.frames_written(), 0);
        assert_eq!(sink.finish().unwrap(), 0);
        assert!(bytes.is_empty());
    }

    #[test]
    fn sink_rejects_second_configure() {
        let mut bytes = Vec::new();
        let mut sink = WavSink::new(&mut bytes);
        sink.configure(PcmFormat::default()).unwrap();
        assert!(sink.configure(PcmFormat::default()).is_err());
        assert_eq!(sink.format(), Some(PcmFormat::default()));
    }
}
