mod asr_engine;
mod engine_factory;

pub use asr_engine::{AsrEngine, EngineError, TranscribeOptions};
pub use engine_factory::EngineFactory;
