//! MLX back-end for mlx-audio compatible models (Qwen3-ASR, Parakeet,
//! Whisper ports), driven through a runner subprocess.

use std::path::Path;

use crate::application::ports::{AsrEngine, EngineError, TranscribeOptions};
use crate::domain::{EngineCapabilities, EngineKind, ModelSpec, Transcript};

use super::runner::{RunnerProcess, RunnerRequest};
use super::sanitize::sanitize_segments;

pub const DEFAULT_MLX_RUNNER: &str = "mlx-asr-runner";

pub struct MlxEngine {
    model_id: String,
    capabilities: EngineCapabilities,
    program: String,
    runner: Option<RunnerProcess>,
}

impl MlxEngine {
    pub fn new(spec: &ModelSpec, program: impl Into<String>) -> Self {
        Self {
            model_id: spec.model_id.clone(),
            capabilities: spec.capabilities,
            program: program.into(),
            runner: None,
        }
    }
}

impl AsrEngine for MlxEngine {
    fn load(&mut self) -> Result<(), EngineError> {
        if self.runner.is_some() {
            tracing::debug!(model = %self.model_id, "model already loaded, skipping");
            return Ok(());
        }
        tracing::info!(model = %self.model_id, "loading MLX model into unified memory");
        let runner = RunnerProcess::spawn(&self.program, &self.model_id)?;
        self.runner = Some(runner);
        tracing::info!(model = %self.model_id, "MLX model loaded");
        Ok(())
    }

    fn transcribe(
        &mut self,
        path: &Path,
        opts: &TranscribeOptions,
    ) -> Result<Transcript, EngineError> {
        let runner = self.runner.as_mut().ok_or(EngineError::NotLoaded)?;
        let audio = path.to_string_lossy();
        let reply = runner.request(&RunnerRequest {
            audio: &audio,
            language: opts.language.as_str(),
            with_timestamp: opts.with_timestamp,
        })?;

        let segments = if self.capabilities.timestamp {
            reply
                .segments
                .map(|raw| sanitize_segments(raw, self.capabilities.diarization))
        } else {
            None
        };

        Ok(Transcript {
            text: reply.text,
            duration: reply.duration,
            language: reply.language,
            segments,
        })
    }

    fn release(&mut self) {
        if let Some(runner) = self.runner.take() {
            tracing::info!(model = %self.model_id, "releasing MLX model");
            runner.shutdown();
        }
    }

    fn capabilities(&self) -> EngineCapabilities {
        self.capabilities
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn engine_kind(&self) -> EngineKind {
        EngineKind::Mlx
    }
}

impl Drop for MlxEngine {
    fn drop(&mut self) {
        self.release();
    }
}
