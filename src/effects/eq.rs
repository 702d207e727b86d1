//! First-order shelving approximation.
//!
//! A shelf is built by filtering one band out with a one-pole RC filter,
//! boosting it, and summing it back onto the complementary band.

use std::f64::consts::PI;

use crate::audio::WaveformBuffer;

use super::dynamics::{apply_gain, overlay};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Response {
    LowPass,
    HighPass,
}

/// One-pole RC filter state for a single channel.
#[derive(Debug, Clone)]
pub struct OnePoleFilter {
    response: Response,
    alpha: f64,
    last_input: f64,
    last_output: f64,
    primed: bool,
}

impl OnePoleFilter {
    pub fn low_pass(cutoff_hz: f64, sample_rate: f64) -> Self {
        let (rc, dt) = rc_dt(cutoff_hz, sample_rate);
        Self::new(Response::LowPass, dt / (rc + dt))
    }

    pub fn high_pass(cutoff_hz: f64, sample_rate: f64) -> Self {
        let (rc, dt) = rc_dt(cutoff_hz, sample_rate);
        Self::new(Response::HighPass, rc / (rc + dt))
    }

    fn new(response: Response, alpha: f64) -> Self {
        Self {
            response,
            alpha,
            last_input: 0.0,
            last_output: 0.0,
            primed: false,
        }
    }

    /// The first sample passes through unchanged and seeds the state.
    pub fn process(&mut self, input: f64) -> f64 {
        if !self.primed {
            self.primed = true;
            self.last_input = input;
            self.last_output = input;
            return input;
        }

        self.last_output = match self.response {
            Response::LowPass => self.last_output + self.alpha * (input - self.last_output),
            Response::HighPass => self.alpha * (self.last_output + input - self.last_input),
        };
        self.last_input = input;
        self.last_output
    }
}

fn rc_dt(cutoff_hz: f64, sample_rate: f64) -> (f64, f64) {
    (1.0 / (cutoff_hz * 2.0 * PI), 1.0 / sample_rate)
}

pub fn low_pass(waveform: &WaveformBuffer, cutoff_hz: f64) -> WaveformBuffer {
    let rate = waveform.sample_rate() as f64;
    filter(waveform, || OnePoleFilter::low_pass(cutoff_hz, rate))
}

pub fn high_pass(waveform: &WaveformBuffer, cutoff_hz: f64) -> WaveformBuffer {
    let rate = waveform.sample_rate() as f64;
    filter(waveform, || OnePoleFilter::high_pass(cutoff_hz, rate))
}

/// Boost content below `cutoff_hz` by `gain_db`.
pub fn low_shelf(waveform: &WaveformBuffer, cutoff_hz: f64, gain_db: f64) -> WaveformBuffer {
    let lows = apply_gain(&low_pass(waveform, cutoff_hz), gain_db);
    overlay(&lows, &high_pass(waveform, cutoff_hz))
}

/// Boost content above `cutoff_hz` by `gain_db`.
pub fn high_shelf(waveform: &WaveformBuffer, cutoff_hz: f64, gain_db: f64) -> WaveformBuffer {
    let highs = apply_gain(&high_pass(waveform, cutoff_hz), gain_db);
    overlay(&highs, &low_pass(waveform, cutoff_hz))
}

fn filter(waveform: &WaveformBuffer, make: impl Fn() -> OnePoleFilter) -> WaveformBuffer {
    let format = waveform.format();
    let channels = format.channels as usize;
    let mut filters: Vec<OnePoleFilter> = (0..channels).map(|_| make()).collect();

    let samples = waveform
        .samples()
        .iter()
        .enumerate()
        .map(|(i, &s)| format.clamp(filters[i % channels].process(s as f64)))
        .collect();
    waveform.with_samples(samples)
}
