mod factory;
mod funasr_engine;
mod mlx_engine;
mod mock_engine;
mod runner;
mod sanitize;

pub use factory::RunnerEngineFactory;
pub use funasr_engine::FunAsrEngine;
pub use mlx_engine::MlxEngine;
pub use mock_engine::{CallLog, Gate, MockEngine, MockEngineFactory};
pub use runner::{RawSegment, RunnerReply};
pub use sanitize::{sanitize_segments, strip_annotation_tags};
