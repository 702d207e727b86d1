use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use crate::audio::{PcmFormat, WavSink};
use crate::chunk::SynthesisChunk;
use crate::error::EngineError;
use crate::SpeechEngine;

use super::config::{config_path_for, load_voice_config, VoiceConfig};

/// Piper always emits 16-bit mono PCM.
const PIPER_SAMPLE_WIDTH: u16 = 2;
const PIPER_CHANNELS: u16 = 1;

#[derive(thiserror::Error, Debug)]
pub enum PiperError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Voice model not found at {0}")]
    ModelNotFound(PathBuf),
    #[error("Invalid voice config {path}: {message}")]
    Config { path: PathBuf, message: String },
    #[error("Speaker {speaker} out of range: voice has {available} speaker(s)")]
    SpeakerOutOfRange { speaker: u32, available: u32 },
}

/// Parameters for loading a Piper voice.
#[derive(Debug, Clone, Default)]
pub struct PiperModelParams {
    /// Path to the `piper` executable. `None` looks it up on PATH.
    pub bin_path: Option<PathBuf>,
    /// Voice config. `None` uses `<model>.json`.
    pub config_path: Option<PathBuf>,
    /// Speaker id for multi-speaker voices.
    pub speaker: Option<u32>,
    /// Phoneme length multiplier passed to Piper; larger is slower speech.
    pub length_scale: Option<f32>,
}

/// Piper text-to-speech through its command-line executable.
///
/// Each call spawns one `piper` process, so a single engine can serve
/// concurrent requests without extra locking.
///
/// ```rust,no_run
/// use malayalam_tts::engines::piper::PiperEngine;
/// use std::path::Path;
///
/// let engine = PiperEngine::load(Path::new("models/ml_IN-arjun-medium.onnx"))?;
/// println!("Voice runs at {} Hz", engine.sample_rate());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct PiperEngine {
    model_path: PathBuf,
    config_path: PathBuf,
    bin_path: PathBuf,
    config: VoiceConfig,
    speaker: Option<u32>,
    length_scale: Option<f32>,
}

impl PiperEngine {
    pub fn load(model_path: &Path) -> Result<Self, PiperError> {
        Self::load_with_params(model_path, PiperModelParams::default())
    }

    pub fn load_with_params(
        model_path: &Path,
        params: PiperModelParams,
    ) -> Result<Self, PiperError> {
        if !model_path.exists() {
            return Err(PiperError::ModelNotFound(model_path.to_path_buf()));
        }

        let config_path = params
            .config_path
            .unwrap_or_else(|| config_path_for(model_path));
        log::info!(
            "Loading Piper voice {} (config {})",
            model_path.display(),
            config_path.display()
        );
        let config = load_voice_config(&config_path)?;

        if let Some(speaker) = params.speaker {
            if speaker >= config.num_speakers {
                return Err(PiperError::SpeakerOutOfRange {
                    speaker,
                    available: config.num_speakers,
                });
            }
        }

        log::info!(
            "Piper voice: {} Hz, {} speaker(s), language {}",
            config.audio.sample_rate,
            config.num_speakers,
            config
                .language
                .as_ref()
                .map(|l| l.code.as_str())
                .unwrap_or("unknown")
        );

        Ok(Self {
            model_path: model_path.to_path_buf(),
            config_path,
            bin_path: params.bin_path.unwrap_or_else(|| PathBuf::from("piper")),
            config,
            speaker: params.speaker,
            length_scale: params.length_scale,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.audio.sample_rate
    }

    pub fn voice_config(&self) -> &VoiceConfig {
        &self.config
    }

    /// PCM layout of everything this voice produces.
    pub fn format(&self) -> PcmFormat {
        PcmFormat {
            sample_rate: self.sample_rate(),
            channels: PIPER_CHANNELS,
            sample_width: PIPER_SAMPLE_WIDTH,
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.bin_path);
        command
            .arg("--model")
            .arg(&self.model_path)
            .arg("--config")
            .arg(&self.config_path)
            .arg("--output-raw");
        if let Some(speaker) = self.speaker {
            command.arg("--speaker").arg(speaker.to_string());
        }
        if let Some(length_scale) = self.length_scale {
            command.arg("--length-scale").arg(length_scale.to_string());
        }
        command
    }

    /// Run Piper once and collect its raw PCM output.
    fn run(&self, text: &str) -> Result<Vec<u8>, EngineError> {
        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EngineError::Inference(format!(
                        "piper executable not found at {}",
                        self.bin_path.display()
                    ))
                } else {
                    EngineError::Io(e)
                }
            })?;

        // Piper streams PCM per input line, so stdin is fed from its own thread
        // while stdout and stderr are drained here.
        let payload = canonicalize_stdin_payload(text).into_owned();
        let writer = child
            .stdin
            .take()
            .map(|mut stdin| thread::spawn(move || stdin.write_all(payload.as_bytes())));

        let output = child.wait_with_output()?;
        let written = match writer {
            Some(handle) => handle.join().map_err(|_| {
                EngineError::Inference("piper stdin writer panicked".to_string())
            })?,
            None => Ok(()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Inference(format!(
                "piper exited with code {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }
        written?;

        log::debug!("Piper produced {} bytes of PCM", output.stdout.len());
        Ok(output.stdout)
    }
}

impl SpeechEngine for PiperEngine {
    fn synthesize_wav(&self, text: &str, sink: &mut WavSink<'_>) -> Result<(), EngineError> {
        let pcm = self.run(text)?;
        sink.configure(self.format())?;
        sink.write_frames(&pcm)
    }

    fn synthesize_chunks(&self, text: &str) -> Result<Vec<SynthesisChunk>, EngineError> {
        let pcm = self.run(text)?;
        if pcm.is_empty() {
            return Ok(Vec::new());
        }
        let format = self.format();
        Ok(vec![SynthesisChunk::from_data(pcm)
            .with_metadata("sample_rate", format.sample_rate)
            .with_metadata("channels", format.channels)
            .with_metadata("sample_width", format.sample_width)])
    }
}

fn canonicalize_stdin_payload(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{input}\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::synthesize;
    use std::fs;

    /// Temporary voice directory with an empty model file and a config.
    struct VoiceDir {
        dir: PathBuf,
        model: PathBuf,
    }

    impl VoiceDir {
        fn new(name: &str, config: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("piper-{name}-{}", std::process::id()));
            fs::create_dir_all(&dir).unwrap();
            let model = dir.join("voice.onnx");
            fs::write(&model, b"").unwrap();
            fs::write(config_path_for(&model), config).unwrap();
            Self { dir, model }
        }
    }

    impl Drop for VoiceDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }

    const CONFIG: &str = r#"{"audio": {"sample_rate": 22050}, "num_speakers": 2}"#;

    /// Engine backed by a shell script standing in for the piper executable.
    #[cfg(unix)]
    fn scripted_engine(voice: &VoiceDir, script: &str) -> PiperEngine {
        use std::os::unix::fs::PermissionsExt;

        let bin = voice.dir.join("fake-piper");
        fs::write(&bin, format!("#!/bin/sh\n{script}\n")).unwrap();
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();
        let params = PiperModelParams {
            bin_path: Some(bin),
            ..Default::default()
        };
        PiperEngine::load_with_params(&voice.model, params).unwrap()
    }

    #[test]
    fn appends_trailing_newline_for_stdin() {
        assert_eq!(canonicalize_stdin_payload("നമസ്കാരം"), "നമസ്കാരം\n");
        assert_eq!(canonicalize_stdin_payload("നമസ്കാരം\n"), "നമസ്കാരം\n");
    }

    #[test]
    fn missing_model_is_reported() {
        let err = PiperEngine::load(Path::new("/nonexistent/voice.onnx")).unwrap_err();
        assert!(matches!(err, PiperError::ModelNotFound(_)));
    }

    #[test]
    fn loads_format_from_voice_config() {
        let voice = VoiceDir::new("format", CONFIG);
        let engine = PiperEngine::load(&voice.model).unwrap();
        assert_eq!(engine.format(), PcmFormat::new(22050, 1, 2).unwrap());
    }

    #[test]
    fn rejects_unknown_speaker() {
        let voice = VoiceDir::new("speaker", CONFIG);
        let params = PiperModelParams {
            speaker: Some(2),
            ..Default::default()
        };
        let err = PiperEngine::load_with_params(&voice.model, params).unwrap_err();
        assert!(matches!(
            err,
            PiperError::SpeakerOutOfRange {
                speaker: 2,
                available: 2
            }
        ));
    }

    #[test]
    fn builds_piper_command_line() {
        let voice = VoiceDir::new("command", CONFIG);
        let params = PiperModelParams {
            speaker: Some(1),
            length_scale: Some(1.25),
            ..Default::default()
        };
        let engine = PiperEngine::load_with_params(&voice.model, params).unwrap();
        let command = engine.command();
        let args: Vec<_> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(command.get_program(), "piper");
        assert!(args.contains(&"--output-raw".to_string()));
        assert!(args.windows(2).any(|w| w == ["--speaker", "1"]));
        assert!(args.windows(2).any(|w| w == ["--length-scale", "1.25"]));
    }

    #[test]
    fn missing_executable_is_an_engine_error() {
        let voice = VoiceDir::new("nobin", CONFIG);
        let params = PiperModelParams {
            bin_path: Some(voice.dir.join("no-such-piper")),
            ..Default::default()
        };
        let engine = PiperEngine::load_with_params(&voice.model, params).unwrap();
        assert!(matches!(
            engine.synthesize_chunks("text"),
            Err(EngineError::Inference(_))
        ));
        assert!(synthesize(&engine, "text").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn long_input_streams_without_blocking() {
        use std::sync::mpsc;
        use std::time::Duration;

        let voice = VoiceDir::new("stream", CONFIG);
        // A tenth of a second of 22050 Hz 16-bit silence per input line.
        let script = "while read line; do head -c 4410 /dev/zero; done";
        let engine = scripted_engine(&voice, script);
        let lines = 4000;
        let text = "നമസ്കാരം\n".repeat(lines);

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(engine.synthesize_chunks(&text));
        });
        let chunks = rx
            .recv_timeout(Duration::from_secs(60))
            .expect("piper call should finish")
            .unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].payload().len(), lines * 4410);
    }

    #[cfg(unix)]
    #[test]
    fn failing_piper_reports_its_stderr() {
        let voice = VoiceDir::new("stderr", CONFIG);
        let engine = scripted_engine(&voice, "echo 'voice model is corrupt' >&2; exit 3");
        let text = "നമസ്കാരം\n".repeat(20000);

        match engine.synthesize_chunks(&text) {
            Err(EngineError::Inference(message)) => {
                assert!(message.contains("voice model is corrupt"), "{message}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn synthesizes_malayalam_with_real_voice() {
        // Skip when piper or the voice model is unavailable in the execution environment.
        let model = Path::new("models/ml_IN-arjun-medium.onnx");
        if Command::new("piper").arg("--help").output().is_err() || !model.exists() {
            return;
        }

        let engine = PiperEngine::load(model).expect("voice should load");
        let audio = synthesize(&engine, "നമസ്കാരം").expect("piper should synthesize");
        let waveform = audio.decode().unwrap();
        assert_eq!(waveform.sample_rate(), engine.sample_rate());
        assert!(waveform.frame_count() > 0);
    }
}
