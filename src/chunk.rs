use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audio::PcmFormat;
use crate::error::{Result, TtsError};

/// Field names probed for the sample rate, first present wins.
pub const SAMPLE_RATE_KEYS: &[&str] = &["sample_rate", "rate", "sampleRate"];
/// Field names probed for the channel count.
pub const CHANNEL_KEYS: &[&str] = &["channels", "num_channels", "numChannels"];
/// Field names probed for the sample width in bytes.
pub const SAMPLE_WIDTH_KEYS: &[&str] = &["sample_width", "sampleWidth", "bytes_per_sample"];

const FALLBACK_SAMPLE_RATE: u32 = 24000;
const FALLBACK_CHANNELS: u16 = 1;
const FALLBACK_SAMPLE_WIDTH: u16 = 2;

/// Optional format fields attached to a chunk by an engine adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkMetadata(BTreeMap<String, Value>);

impl ChunkMetadata {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Return the first key from `names` that is present, with its value.
    pub fn probe<'a>(&self, names: &[&'a str]) -> Option<(&'a str, &Value)> {
        names
            .iter()
            .find_map(|&name| self.0.get(name).map(|value| (name, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One unit of raw audio emitted by an engine.
///
/// An adapter fills whichever payload its engine produces. When several are
/// set, [`payload`](Self::payload) prefers `data`, then `samples`, then `raw`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisChunk {
    /// Encoded PCM bytes.
    pub data: Option<Vec<u8>>,
    /// Decoded 16-bit samples.
    pub samples: Option<Vec<i16>>,
    /// The chunk itself, when the engine yields bare byte buffers.
    pub raw: Vec<u8>,
    pub metadata: ChunkMetadata,
}

impl SynthesisChunk {
    pub fn from_bytes(raw: impl Into<Vec<u8>>) -> Self {
        Self {
            raw: raw.into(),
            ..Default::default()
        }
    }

    pub fn from_data(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Some(data.into()),
            ..Default::default()
        }
    }

    pub fn from_samples(samples: impl Into<Vec<i16>>) -> Self {
        Self {
            samples: Some(samples.into()),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn payload(&self) -> Cow<'_, [u8]> {
        if let Some(data) = &self.data {
            return Cow::Borrowed(data);
        }
        if let Some(samples) = &self.samples {
            return Cow::Owned(samples.iter().flat_map(|s| s.to_le_bytes()).collect());
        }
        Cow::Borrowed(&self.raw)
    }

    /// Format declared by this chunk, with fallbacks for missing fields.
    pub fn format(&self) -> Result<PcmFormat> {
        let sample_rate = self.lookup(SAMPLE_RATE_KEYS, FALLBACK_SAMPLE_RATE)?;
        let channels = self.lookup(CHANNEL_KEYS, FALLBACK_CHANNELS)?;
        let sample_width = self.lookup(SAMPLE_WIDTH_KEYS, FALLBACK_SAMPLE_WIDTH)?;
        PcmFormat::new(sample_rate, channels, sample_width)
            .map_err(|e| TtsError::synthesis(format!("chunk declares an unusable format: {e}")))
    }

    /// A present-but-null or zero field counts as missing.
    fn lookup<T>(&self, names: &[&str], fallback: T) -> Result<T>
    where
        T: TryFrom<u64> + Copy,
    {
        let Some((name, value)) = self.metadata.probe(names) else {
            return Ok(fallback);
        };

        let number = match value {
            Value::Null => return Ok(fallback),
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        let number = number.ok_or_else(|| {
            TtsError::synthesis(format!(
                "chunk metadata field '{name}' is not a non-negative integer: {value}"
            ))
        })?;
        if number == 0 {
            return Ok(fallback);
        }

        T::try_from(number).map_err(|_| {
            TtsError::synthesis(format!(
                "chunk metadata field '{name}' is out of range: {number}"
            ))
        })
    }
}
