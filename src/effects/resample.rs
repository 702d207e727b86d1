use crate::audio::WaveformBuffer;

/// Linear-interpolation resampler, applied per channel.
pub fn resample_linear(waveform: &WaveformBuffer, target_rate: u32) -> WaveformBuffer {
    let format = waveform.format();
    if format.sample_rate == target_rate || waveform.is_empty() {
        return waveform.clone().reinterpret_rate(target_rate);
    }

    let channels = format.channels as usize;
    let frames = waveform.frame_count();
    let input = waveform.samples();

    let step = format.sample_rate as f64 / target_rate as f64;
    let n_out = (frames as f64 / step).round() as usize;
    let mut out = Vec::with_capacity(n_out * channels);

    for i in 0..n_out {
        let pos = i as f64 * step;
        let idx = (pos.floor() as usize).min(frames - 1);
        let frac = pos - idx as f64;
        let next = if idx + 1 < frames { idx + 1 } else { idx };

        for ch in 0..channels {
            let x0 = input[idx * channels + ch] as f64;
            let x1 = input[next * channels + ch] as f64;
            out.push(format.clamp(((1.0 - frac) * x0 + frac * x1).round()));
        }
    }

    waveform.with_samples(out).reinterpret_rate(target_rate)
}
