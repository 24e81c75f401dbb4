//! FunASR back-end, driven through a runner subprocess.

use std::path::Path;

use crate::application::ports::{AsrEngine, EngineError, TranscribeOptions};
use crate::domain::{EngineCapabilities, EngineKind, ModelSpec, Transcript};

use super::runner::{RunnerProcess, RunnerRequest};
use super::sanitize::{sanitize_segments, strip_annotation_tags};

pub const DEFAULT_FUNASR_RUNNER: &str = "funasr-runner";

pub struct FunAsrEngine {
    model_id: String,
    capabilities: EngineCapabilities,
    program: String,
    runner: Option<RunnerProcess>,
}

impl FunAsrEngine {
    pub fn new(spec: &ModelSpec, program: impl Into<String>) -> Self {
        Self {
            model_id: spec.model_id.clone(),
            capabilities: spec.capabilities,
            program: program.into(),
            runner: None,
        }
    }
}

impl AsrEngine for FunAsrEngine {
    fn load(&mut self) -> Result<(), EngineError> {
        if self.runner.is_some() {
            tracing::debug!(model = %self.model_id, "model already loaded, skipping");
            return Ok(());
        }
        tracing::info!(model = %self.model_id, "loading FunASR model");
        let runner = RunnerProcess::spawn(&self.program, &self.model_id)?;
        self.runner = Some(runner);
        tracing::info!(model = %self.model_id, "FunASR model loaded");
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

        // SenseVoice-family models wrap their text in annotation tokens
        // that are meaningless to clients.
        let text = if self.capabilities.emotion_tags {
            strip_annotation_tags(&reply.text)
        } else {
            reply.text
        };

        let segments = if self.capabilities.timestamp {
            reply
                .segments
                .map(|raw| sanitize_segments(raw, self.capabilities.diarization))
        } else {
            None
        };

        Ok(Transcript {
            text,
            duration: reply.duration,
            language: reply.language,
            segments,
        })
    }

    fn release(&mut self) {
        if let Some(runner) = self.runner.take() {
            tracing::info!(model = %self.model_id, "releasing FunASR model");
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
        EngineKind::FunAsr
    }
}

impl Drop for FunAsrEngine {
    fn drop(&mut self) {
        self.release();
    }
}
