use crate::audio::WaveformBuffer;

pub fn db_to_gain(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Multiply every sample by `db` decibels of gain, saturating at full scale.
pub fn apply_gain(waveform: &WaveformBuffer, db: f64) -> WaveformBuffer {
    scale(waveform, db_to_gain(db))
}

/// Sample-wise saturating sum of two waveforms in the same format.
///
/// The result has the length of `base`; a shorter `layer` leaves the tail of
/// `base` untouched.
pub fn overlay(base: &WaveformBuffer, layer: &WaveformBuffer) -> WaveformBuffer {
    debug_assert_eq!(base.format(), layer.format());
    let format = base.format();
    let mut samples = base.samples().to_vec();
    for (out, &add) in samples.iter_mut().zip(layer.samples()) {
        *out = format.clamp(*out as f64 + add as f64);
    }
    base.with_samples(samples)
}

/// Scale so the peak sits `headroom_db` below full scale.
///
/// Silent input is returned unchanged.
pub fn normalize(waveform: &WaveformBuffer, headroom_db: f64) -> WaveformBuffer {
    let peak = waveform.peak();
    if peak == 0 {
        return waveform.clone();
    }
    let target = waveform.format().max_amplitude() * db_to_gain(-headroom_db);
    scale(waveform, target / peak as f64)
}

fn scale(waveform: &WaveformBuffer, factor: f64) -> WaveformBuffer {
    let format = waveform.format();
    let samples = waveform
        .samples()
        .iter()
        .map(|&s| format.clamp(s as f64 * factor))
        .collect();
    waveform.with_samples(samples)
}
