/// Canonical output sample rate (matches the common 24 kHz neural vocoders).
pub const STANDARD_SAMPLE_RATE: u32 = 24000;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("sample rate must be positive")]
    ZeroSampleRate,
    #[error("channel count must be at least 1")]
    NoChannels,
    #[error("unsupported sample width: {0} bytes (expected 1-4)")]
    UnsupportedWidth(u16),
    #[error("{len} bytes is not a whole number of {frame}-byte frames")]
    Misaligned { len: usize, frame: usize },
    #[error("sample {sample} does not fit in {width} bytes")]
    SampleOutOfRange { sample: i32, width: u16 },
}

/// Sample layout of a PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
    /// Bytes per sample.
    pub sample_width: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: STANDARD_SAMPLE_RATE,
            channels: 1,
            sample_width: 2,
        }
    }
}

impl PcmFormat {
    pub fn new(sample_rate: u32, channels: u16, sample_width: u16) -> Result<Self, FormatError> {
        let format = Self {
            sample_rate,
            channels,
            sample_width,
        };
        format.check()?;
        Ok(format)
    }

    pub fn check(&self) -> Result<(), FormatError> {
        if self.sample_rate == 0 {
            return Err(FormatError::ZeroSampleRate);
        }
        if self.channels == 0 {
            return Err(FormatError::NoChannels);
        }
        if !(1..=4).contains(&self.sample_width) {
            return Err(FormatError::UnsupportedWidth(self.sample_width));
        }
        Ok(())
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.sample_width * 8
    }

    /// Bytes per frame (one sample for every channel).
    pub fn frame_width(&self) -> usize {
        self.channels as usize * self.sample_width as usize
    }

    /// Smallest and largest representable sample value.
    pub fn sample_bounds(&self) -> (i32, i32) {
        match self.sample_width {
            1 => (i8::MIN as i32, i8::MAX as i32),
            2 => (i16::MIN as i32, i16::MAX as i32),
            3 => (-(1 << 23), (1 << 23) - 1),
            _ => (i32::MIN, i32::MAX),
        }
    }

    /// Full-scale amplitude, `2^(bits - 1)`.
    pub fn max_amplitude(&self) -> f64 {
        2f64.powi(self.bits_per_sample() as i32 - 1)
    }

    pub(crate) fn clamp(&self, value: f64) -> i32 {
        let (min, max) = self.sample_bounds();
        value.clamp(min as f64, max as f64) as i32
    }
}

/// Decoded, immutable PCM audio.
///
/// Samples are stored interleaved and widened to `i32`; 8-bit audio is kept
/// signed (offset removed) so every width shares the same arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveformBuffer {
    format: PcmFormat,
    samples: Vec<i32>,
}

impl WaveformBuffer {
    pub fn new(format: PcmFormat, samples: Vec<i32>) -> Result<Self, FormatError> {
        format.check()?;
        let channels = format.channels as usize;
        if samples.len() % channels != 0 {
            return Err(FormatError::Misaligned {
                len: samples.len() * format.sample_width as usize,
                frame: format.frame_width(),
            });
        }
        let (min, max) = format.sample_bounds();
        if let Some(&sample) = samples.iter().find(|&&s| s < min || s > max) {
            return Err(FormatError::SampleOutOfRange {
                sample,
                width: format.sample_width,
            });
        }
        Ok(Self { format, samples })
    }

    /// Interpret little-endian PCM bytes (unsigned for 8-bit, signed otherwise).
    pub fn from_pcm_bytes(format: PcmFormat, bytes: &[u8]) -> Result<Self, FormatError> {
        format.check()?;
        let frame = format.frame_width();
        if bytes.len() % frame != 0 {
            return Err(FormatError::Misaligned {
                len: bytes.len(),
                frame,
            });
        }

        let samples = bytes
            .chunks_exact(format.sample_width as usize)
            .map(read_sample)
            .collect();
        Ok(Self { format, samples })
    }

    pub fn to_pcm_bytes(&self) -> Vec<u8> {
        let width = self.format.sample_width as usize;
        let mut out = Vec::with_capacity(self.samples.len() * width);
        for &sample in &self.samples {
            write_sample(&mut out, sample, width);
        }
        out
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    pub fn sample_rate(&self) -> u32 {
        self.format.sample_rate
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.format.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.format.sample_rate as f64
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> u32 {
        self.samples
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0)
    }

    /// Same format, new sample data. Callers keep the channel alignment.
    pub(crate) fn with_samples(&self, samples: Vec<i32>) -> Self {
        debug_assert_eq!(samples.len() % self.format.channels as usize, 0);
        Self {
            format: self.format,
            samples,
        }
    }

    /// Keep the sample data but declare a different rate.
    pub(crate) fn reinterpret_rate(self, sample_rate: u32) -> Self {
        Self {
            format: PcmFormat {
                sample_rate: sample_rate.max(1),
                ..self.format
            },
            samples: self.samples,
        }
    }
}

fn read_sample(bytes: &[u8]) -> i32 {
    match bytes.len() {
        1 => bytes[0] as i32 - 128,
        2 => i16::from_le_bytes([bytes[0], bytes[1]]) as i32,
        3 => {
            let sign = if bytes[2] & 0x80 != 0 { 0xff } else { 0x00 };
            i32::from_le_bytes([bytes[0], bytes[1], bytes[2], sign])
        }
        _ => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    }
}

fn write_sample(out: &mut Vec<u8>, sample: i32, width: usize) {
    match width {
        1 => out.push((sample + 128) as u8),
        2 => out.extend_from_slice(&(sample as i16).to_le_bytes()),
        3 => out.extend_from_slice(&sample.to_le_bytes()[..3]),
        _ => out.extend_from_slice(&sample.to_le_bytes()),
    }
}
