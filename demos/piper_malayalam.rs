use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use malayalam_tts::{
    engines::piper::{PiperEngine, PiperModelParams},
    EffectParametersBuilder, TtsPipeline,
};

const TEXT: &str = "ഡൽഹി സ്ഫോടനത്തിൽ പൊട്ടിത്തെറിച്ചത് ഐ20 കാറെന്ന് ഡൽഹി പൊലീസ്. \
                    വാഹനത്തിൽ ഉണ്ടായിരുന്നത് മൂന്ന് പേർ എന്നതാണ് വിവരം. \
                    സ്ഫോടനം സംഭവിച്ചത് വാഹനത്തിന്റെ പുറകിൽ നിന്ന് എന്നും സൂചന.";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let model_path = PathBuf::from("models/ml_IN-arjun-medium.onnx");

    let load_start = Instant::now();
    let engine = PiperEngine::load_with_params(&model_path, PiperModelParams::default())?;
    println!(
        "Voice loaded in {:.2?} ({} Hz)",
        load_start.elapsed(),
        engine.sample_rate()
    );

    let pipeline = TtsPipeline::new(Arc::new(engine));

    let synth_start = Instant::now();
    let raw = pipeline.synthesize(TEXT)?.decode()?;
    let synth_dur = synth_start.elapsed();
    println!(
        "Synthesized {:.2}s audio in {:.2?} ({:.1}x real-time)",
        raw.duration_secs(),
        synth_dur,
        raw.duration_secs() / synth_dur.as_secs_f64()
    );

    let params = EffectParametersBuilder::default()
        .pitch_semitones(2.0)
        .speed_percent(110)
        .bass_gain_db(4.0)
        .volume_gain_db(-3.0)
        .build()?;

    pipeline.render_to_file(TEXT, &params, Path::new("output.wav"))?;
    println!("Saved to output.wav");

    Ok(())
}
