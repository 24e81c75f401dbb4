use std::fmt;

use serde::{Deserialize, Serialize};

use super::EngineCapabilities;

/// Which back-end family runs a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    FunAsr,
    Mlx,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::FunAsr => "funasr",
            EngineKind::Mlx => "mlx",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EngineKind {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "funasr" => Ok(Self::FunAsr),
            "mlx" => Ok(Self::Mlx),
            other => Err(format!(
                "Invalid engine type: {}. Expected: funasr or mlx",
                other
            )),
        }
    }
}

/// Complete specification for a named ASR model.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub alias: String,
    pub engine_kind: EngineKind,
    pub model_id: String,
    pub description: String,
    pub capabilities: EngineCapabilities,
}

// Two specs denote the same loaded model when id and back-end agree;
// descriptions and ad-hoc aliases don't participate.
impl PartialEq for ModelSpec {
    fn eq(&self, other: &Self) -> bool {
        self.model_id == other.model_id && self.engine_kind == other.engine_kind
    }
}

impl Eq for ModelSpec {}
