use crate::application::ports::{AsrEngine, EngineFactory};
use crate::domain::{EngineKind, ModelSpec};

use super::funasr_engine::{FunAsrEngine, DEFAULT_FUNASR_RUNNER};
use super::mlx_engine::{MlxEngine, DEFAULT_MLX_RUNNER};

/// Builds runner-backed engines. The runner binaries are overridable
/// through the environment so deployments can point at their own
/// wrapper scripts.
pub struct RunnerEngineFactory {
    funasr_program: String,
    mlx_program: String,
}

impl RunnerEngineFactory {
    pub fn new(funasr_program: impl Into<String>, mlx_program: impl Into<String>) -> Self {
        Self {
            funasr_program: funasr_program.into(),
            mlx_program: mlx_program.into(),
        }
    }

    pub fn from_env() -> Self {
        Self {
            funasr_program: std::env::var("FUNASR_RUNNER_BIN")
                .unwrap_or_else(|_| DEFAULT_FUNASR_RUNNER.to_string()),
            mlx_program: std::env::var("MLX_RUNNER_BIN")
                .unwrap_or_else(|_| DEFAULT_MLX_RUNNER.to_string()),
        }
    }
}

impl EngineFactory for RunnerEngineFactory {
    fn create(&self, spec: &ModelSpec) -> Box<dyn AsrEngine> {
        match spec.engine_kind {
            EngineKind::FunAsr => Box::new(FunAsrEngine::new(spec, &self.funasr_program)),
            EngineKind::Mlx => Box::new(MlxEngine::new(spec, &self.mlx_program)),
        }
    }
}
