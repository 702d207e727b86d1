//! Post-processing chain applied to synthesized speech.
//!
//! Stages run in a fixed order, each skipped when its parameter is neutral:
//!
//! 1. pitch shift
//! 2. speed change
//! 3. bass shelf
//! 4. treble shelf
//! 5. volume gain
//! 6. peak normalization
//!
//! Pitch and speed both work by reinterpreting the samples at a scaled rate
//! and resampling back to the standard rate, so each changes pitch and
//! duration together. Shelves only boost; a negative shelf gain is skipped.

pub mod dynamics;
pub mod eq;
mod params;
pub mod resample;

pub use params::{
    EffectParameters, EffectParametersBuilder, PITCH_RANGE, SHELF_GAIN_RANGE, SPEED_RANGE,
    VOLUME_GAIN_RANGE,
};

use crate::audio::{EncodedAudio, WaveformBuffer};
use crate::config::PipelineConfig;
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct EffectsProcessor {
    config: PipelineConfig,
}

impl EffectsProcessor {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Decode, run the chain, re-encode.
    ///
    /// Neutral parameters return the input bytes unchanged once they have been
    /// confirmed to decode.
    pub fn process(&self, audio: &EncodedAudio, params: &EffectParameters) -> Result<EncodedAudio> {
        params.validate()?;
        let waveform = audio.decode()?;
        if params.is_noop() {
            return Ok(audio.clone());
        }
        EncodedAudio::encode(&self.apply(waveform, params))
    }

    pub fn apply(&self, waveform: WaveformBuffer, params: &EffectParameters) -> WaveformBuffer {
        let mut audio = waveform;

        if params.pitch_semitones != 0.0 {
            let factor = 2f64.powf(params.pitch_semitones as f64 / 12.0);
            log::debug!("Pitch shift {} st (rate x{factor:.4})", params.pitch_semitones);
            audio = self.change_playback_rate(audio, factor);
        }

        if params.speed_percent != 100 {
            let factor = params.speed_percent as f64 / 100.0;
            log::debug!("Speed change {}%", params.speed_percent);
            audio = self.change_playback_rate(audio, factor);
        }

        if params.bass_gain_db > 0.0 {
            log::debug!(
                "Bass shelf +{} dB below {} Hz",
                params.bass_gain_db,
                self.config.bass_cutoff_hz
            );
            audio = eq::low_shelf(&audio, self.config.bass_cutoff_hz, params.bass_gain_db as f64);
        } else if params.bass_gain_db < 0.0 {
            log::warn!(
                "Bass cut of {} dB requested; only boosts are supported, skipping",
                params.bass_gain_db
            );
        }

        if params.treble_gain_db > 0.0 {
            log::debug!(
                "Treble shelf +{} dB above {} Hz",
                params.treble_gain_db,
                self.config.treble_cutoff_hz
            );
            audio = eq::high_shelf(
                &audio,
                self.config.treble_cutoff_hz,
                params.treble_gain_db as f64,
            );
        } else if params.treble_gain_db < 0.0 {
            log::warn!(
                "Treble cut of {} dB requested; only boosts are supported, skipping",
                params.treble_gain_db
            );
        }

        if params.volume_gain_db != 0.0 {
            log::debug!("Volume gain {} dB", params.volume_gain_db);
            audio = dynamics::apply_gain(&audio, params.volume_gain_db as f64);
        }

        if params.normalize {
            audio = dynamics::normalize(&audio, self.config.normalize_headroom_db);
        }

        audio
    }

    /// Play the samples back `factor` times faster, then resample to the
    /// standard rate. Pitch and duration change together.
    fn change_playback_rate(&self, waveform: WaveformBuffer, factor: f64) -> WaveformBuffer {
        let rate = (waveform.sample_rate() as f64 * factor) as u32;
        let reinterpreted = waveform.reinterpret_rate(rate);
        resample::resample_linear(&reinterpreted, self.config.standard_sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::PcmFormat;
    use crate::error::TtsError;
    use std::f64::consts::PI;

    fn speech_like(rate: u32, secs: f64) -> WaveformBuffer {
        let format = PcmFormat::new(rate, 1, 2).unwrap();
        let frames = (rate as f64 * secs) as usize;
        let samples = (0..frames)
            .map(|i| {
                let t = i as f64 / rate as f64;
                let voice = 3000.0 * (2.0 * PI * 180.0 * t).sin();
                let sibilance = 1500.0 * (2.0 * PI * 2400.0 * t).sin();
                (voice + sibilance) as i32
            })
            .collect();
        WaveformBuffer::new(format, samples).unwrap()
    }

    fn process(input: &EncodedAudio, params: &EffectParameters) -> WaveformBuffer {
        EffectsProcessor::default()
            .process(input, params)
            .unwrap()
            .decode()
            .unwrap()
    }

    fn encoded(rate: u32, secs: f64) -> EncodedAudio {
        EncodedAudio::encode(&speech_like(rate, secs)).unwrap()
    }

    #[test]
    fn neutral_parameters_pass_through() {
        let input = encoded(22050, 0.5);
        let output = EffectsProcessor::default()
            .process(&input, &EffectParameters::passthrough())
            .unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn decode_encode_without_effects_is_byte_identical() {
        let input = encoded(24000, 0.25);
        let waveform = input.decode().unwrap();
        let processed =
            EffectsProcessor::default().apply(waveform, &EffectParameters::passthrough());
        assert_eq!(EncodedAudio::encode(&processed).unwrap(), input);
    }

    #[test]
    fn double_speed_halves_duration() {
        let input = encoded(24000, 1.0);
        let params = EffectParameters {
            speed_percent: 200,
            ..EffectParameters::passthrough()
        };
        let output = process(&input, &params);
        assert_eq!(output.sample_rate(), 24000);
        assert!((output.duration_secs() - 0.5).abs() < 0.001);
    }

    #[test]
    fn half_speed_doubles_duration() {
        let input = encoded(24000, 1.0);
        let params = EffectParameters {
            speed_percent: 50,
            ..EffectParameters::passthrough()
        };
        let output = process(&input, &params);
        assert!((output.duration_secs() - 2.0).abs() < 0.001);
    }

    #[test]
    fn pitch_up_an_octave_halves_duration_at_standard_rate() {
        let input = encoded(22050, 1.0);
        let params = EffectParameters {
            pitch_semitones: 12.0,
            ..EffectParameters::passthrough()
        };
        let output = process(&input, &params);
        assert_eq!(output.sample_rate(), 24000);
        assert!((output.duration_secs() - 0.5).abs() < 0.001);
    }

    #[test]
    fn pitch_and_speed_compose() {
        let input = speech_like(24000, 1.0);
        let params = EffectParameters {
            pitch_semitones: -12.0,
            speed_percent: 200,
            ..EffectParameters::passthrough()
        };
        let output = EffectsProcessor::default().apply(input, &params);
        assert!((output.duration_secs() - 1.0).abs() < 0.001);
    }

    #[test]
    fn normalization_hits_full_scale_without_clipping() {
        let input = encoded(24000, 0.5);
        let params = EffectParameters {
            volume_gain_db: -12.0,
            ..Default::default()
        };
        let output = process(&input, &params);
        let peak = output.peak() as f64;
        assert!(peak <= 32768.0);
        assert!((peak - 32767.0).abs() / 32767.0 < 0.015, "peak {peak}");
    }

    #[test]
    fn normalization_runs_after_boosts() {
        let input = encoded(24000, 0.5);
        let params = EffectParameters {
            bass_gain_db: 15.0,
            treble_gain_db: 15.0,
            volume_gain_db: 20.0,
            ..Default::default()
        };
        let output = process(&input, &params);
        assert!(output.peak() <= 32768);
        assert!(output.peak() > 31000);
    }

    #[test]
    fn negative_shelves_leave_audio_untouched() {
        let input = speech_like(24000, 0.2);
        let params = EffectParameters {
            bass_gain_db: -10.0,
            treble_gain_db: -10.0,
            ..EffectParameters::passthrough()
        };
        assert_eq!(EffectsProcessor::default().apply(input.clone(), &params), input);
    }

    #[test]
    fn bass_boost_changes_the_signal() {
        let input = speech_like(24000, 0.2);
        let params = EffectParameters {
            bass_gain_db: 6.0,
            ..EffectParameters::passthrough()
        };
        let output = EffectsProcessor::default().apply(input.clone(), &params);
        assert_eq!(output.frame_count(), input.frame_count());
        assert!(output.peak() > input.peak());
    }

    #[test]
    fn out_of_range_parameters_fail_validation() {
        let params = EffectParameters {
            volume_gain_db: 25.0,
            ..Default::default()
        };
        let err = EffectsProcessor::default().process(&encoded(24000, 0.1), &params).unwrap_err();
        assert!(matches!(err, TtsError::Validation { .. }));
    }

    #[test]
    fn malformed_input_is_a_decode_error() {
        let garbage = EncodedAudio::from_bytes(vec![0x52, 0x49, 0x46, 0x46, 0, 0]);
        let err = EffectsProcessor::default()
            .process(&garbage, &EffectParameters::default())
            .unwrap_err();
        assert!(matches!(err, TtsError::Decode(_)));
    }

    #[test]
    fn custom_standard_rate_is_honoured() {
        let processor = EffectsProcessor::new(PipelineConfig {
            standard_sample_rate: 16000,
            ..Default::default()
        });
        let params = EffectParameters {
            speed_percent: 150,
            ..EffectParameters::passthrough()
        };
        let output = processor.apply(speech_like(24000, 1.0), &params);
        assert_eq!(output.sample_rate(), 16000);
        assert!((output.duration_secs() - 1.0 / 1.5).abs() < 0.001);
    }
}
