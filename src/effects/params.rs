use derive_builder::{Builder, UninitializedFieldError};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TtsError};

pub const PITCH_RANGE: (f32, f32) = (-12.0, 12.0);
pub const SPEED_RANGE: (u32, u32) = (50, 200);
pub const SHELF_GAIN_RANGE: (f32, f32) = (-15.0, 15.0);
pub const VOLUME_GAIN_RANGE: (f32, f32) = (-20.0, 20.0);

/// Post-processing settings for one request.
///
/// Every field defaults to its no-op value except `normalize`, which is on
/// by default. Missing fields in serialized input take those defaults.
///
/// ```
/// use malayalam_tts::EffectParametersBuilder;
///
/// let params = EffectParametersBuilder::default()
///     .pitch_semitones(3.0)
///     .speed_percent(120)
///     .build()?;
/// assert!(params.normalize);
/// # Ok::<(), malayalam_tts::TtsError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(default, build_fn(validate = "Self::validate", error = "TtsError"))]
#[serde(default)]
pub struct EffectParameters {
    /// Pitch shift in semitones, [-12, 12].
    pub pitch_semitones: f32,
    /// Playback speed in percent, [50, 200].
    pub speed_percent: u32,
    /// Low shelf gain in dB, [-15, 15]. Only boosts take effect.
    pub bass_gain_db: f32,
    /// High shelf gain in dB, [-15, 15]. Only boosts take effect.
    pub treble_gain_db: f32,
    /// Uniform gain in dB, [-20, 20].
    pub volume_gain_db: f32,
    pub normalize: bool,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            pitch_semitones: 0.0,
            speed_percent: 100,
            bass_gain_db: 0.0,
            treble_gain_db: 0.0,
            volume_gain_db: 0.0,
            normalize: true,
        }
    }
}

impl EffectParameters {
    /// Settings that leave the waveform untouched.
    pub fn passthrough() -> Self {
        Self {
            normalize: false,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_float("pitch_semitones", self.pitch_semitones, PITCH_RANGE)?;
        check_speed(self.speed_percent)?;
        check_float("bass_gain_db", self.bass_gain_db, SHELF_GAIN_RANGE)?;
        check_float("treble_gain_db", self.treble_gain_db, SHELF_GAIN_RANGE)?;
        check_float("volume_gain_db", self.volume_gain_db, VOLUME_GAIN_RANGE)
    }

    /// True when no stage of the chain would change the audio.
    pub fn is_noop(&self) -> bool {
        self.pitch_semitones == 0.0
            && self.speed_percent == 100
            && self.bass_gain_db <= 0.0
            && self.treble_gain_db <= 0.0
            && self.volume_gain_db == 0.0
            && !self.normalize
    }
}

impl EffectParametersBuilder {
    fn validate(&self) -> Result<()> {
        if let Some(value) = self.pitch_semitones {
            check_float("pitch_semitones", value, PITCH_RANGE)?;
        }
        if let Some(value) = self.speed_percent {
            check_speed(value)?;
        }
        if let Some(value) = self.bass_gain_db {
            check_float("bass_gain_db", value, SHELF_GAIN_RANGE)?;
        }
        if let Some(value) = self.treble_gain_db {
            check_float("treble_gain_db", value, SHELF_GAIN_RANGE)?;
        }
        if let Some(value) = self.volume_gain_db {
            check_float("volume_gain_db", value, VOLUME_GAIN_RANGE)?;
        }
        Ok(())
    }
}

impl From<UninitializedFieldError> for TtsError {
    fn from(err: UninitializedFieldError) -> Self {
        TtsError::validation(err.field_name(), "field was not set")
    }
}

fn check_float(name: &str, value: f32, (min, max): (f32, f32)) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(TtsError::validation(
            name,
            format!("must be within [{min}, {max}], got {value}"),
        ))
    }
}

fn check_speed(value: u32) -> Result<()> {
    let (min, max) = SPEED_RANGE;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(TtsError::validation(
            "speed_percent",
            format!("must be within [{min}, {max}], got {value}"),
        ))
    }
}
