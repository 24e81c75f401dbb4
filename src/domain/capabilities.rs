use serde::{Deserialize, Serialize};

/// Declares what a loaded ASR model can produce.
///
/// Immutable once an engine is loaded; the admission layer consults it
/// before a request is ever queued, so capability mismatches surface as
/// 400s instead of silent downgrades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineCapabilities {
    pub timestamp: bool,
    pub diarization: bool,
    pub emotion_tags: bool,
    pub language_detect: bool,
}

impl EngineCapabilities {
    /// The safest assumption for models not in the registry: plain
    /// timestamped transcription, nothing more.
    pub fn conservative() -> Self {
        Self {
            timestamp: true,
            diarization: false,
            emotion_tags: false,
            language_detect: false,
        }
    }
}
