use std::path::Path;

use crate::domain::{EngineCapabilities, EngineKind, Language, Transcript};

/// Per-call knobs forwarded to the engine.
#[derive(Debug, Clone, Copy)]
pub struct TranscribeOptions {
    pub language: Language,
    pub with_timestamp: bool,
}

/// Uniform contract over ASR back-ends.
///
/// Engines are deliberately synchronous: every call blocks, may take
/// tens of seconds (`load`) or minutes (`transcribe`), and must only
/// ever run on the scheduler's dedicated worker thread. Nothing here
/// is safe to call from the HTTP runtime.
pub trait AsrEngine: Send {
    /// Bring the model into memory. Idempotent on success.
    fn load(&mut self) -> Result<(), EngineError>;

    /// Run inference on one audio file. Blocking.
    fn transcribe(
        &mut self,
        path: &Path,
        opts: &TranscribeOptions,
    ) -> Result<Transcript, EngineError>;

    /// Free all accelerator memory. Best-effort: failures are logged
    /// inside the engine and never propagated, so a swap can proceed.
    fn release(&mut self);

    fn capabilities(&self) -> EngineCapabilities;

    fn model_id(&self) -> &str;

    fn engine_kind(&self) -> EngineKind;
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("model load failed: {0}")]
    LoadFailed(String),
    #[error("transcription failed: {0}")]
    InferenceFailed(String),
    #[error("model not loaded")]
    NotLoaded,
}
