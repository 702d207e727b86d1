use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::audio::EncodedAudio;
use crate::config::PipelineConfig;
use crate::effects::{EffectParameters, EffectsProcessor};
use crate::error::Result;
use crate::normalizer;
use crate::SpeechEngine;

/// Shared handle to a loaded engine.
pub type SharedEngine = Arc<dyn SpeechEngine + Send + Sync>;

/// Text in, processed WAV out.
///
/// The engine is loaded once by the caller and shared; a pipeline is cheap to
/// clone and every call is independent.
#[derive(Clone)]
pub struct TtsPipeline {
    engine: SharedEngine,
    effects: EffectsProcessor,
}

impl TtsPipeline {
    pub fn new(engine: SharedEngine) -> Self {
        Self::with_config(engine, PipelineConfig::default())
    }

    pub fn with_config(engine: SharedEngine, config: PipelineConfig) -> Self {
        Self {
            engine,
            effects: EffectsProcessor::new(config),
        }
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    pub fn effects(&self) -> &EffectsProcessor {
        &self.effects
    }

    /// Synthesize without post-processing.
    pub fn synthesize(&self, text: &str) -> Result<EncodedAudio> {
        normalizer::synthesize(self.engine.as_ref(), text)
    }

    /// Synthesize and run the effects chain.
    pub fn render(&self, text: &str, params: &EffectParameters) -> Result<EncodedAudio> {
        params.validate()?;

        let start = Instant::now();
        let raw = self.synthesize(text)?;
        log::debug!("Synthesized {} bytes in {:.2?}", raw.len(), start.elapsed());

        let processed = self.effects.process(&raw, params)?;
        log::info!(
            "Rendered {} chars into {} bytes in {:.2?}",
            text.chars().count(),
            processed.len(),
            start.elapsed()
        );
        Ok(processed)
    }

    /// [`render`](Self::render), then write the WAV to `path`.
    pub fn render_to_file(
        &self,
        text: &str,
        params: &EffectParameters,
        path: &Path,
    ) -> Result<()> {
        self.render(text, params)?.write_to_file(path)
    }
}
