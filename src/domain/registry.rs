//! Static registry of supported ASR models.
//!
//! Single source of truth for alias resolution: new back-ends are added
//! by extending the table, not by editing dispatch code.

use std::sync::LazyLock;

use super::{EngineCapabilities, EngineKind, ModelSpec};

/// OpenAI-compat placeholder values that mean "use the server's current
/// model". The empty string is included because form clients often
/// serialise an omitted field as `""`.
const PASSTHROUGH_VALUES: &[&str] = &["", "whisper-1"];

static REGISTRY: LazyLock<Vec<ModelSpec>> = LazyLock::new(|| {
    let mut specs = vec![
        ModelSpec {
            alias: "paraformer".to_string(),
            engine_kind: EngineKind::FunAsr,
            model_id: "iic/speech_seaco_paraformer_large_asr_nat-zh-cn-16k-common-vocab8404-pytorch"
                .to_string(),
            description: "Mandarin + speaker diarization (FunASR). Best for multi-speaker podcasts."
                .to_string(),
            capabilities: EngineCapabilities {
                timestamp: true,
                diarization: true,
                emotion_tags: false,
                language_detect: true,
            },
        },
        ModelSpec {
            alias: "qwen3-asr-mini".to_string(),
            engine_kind: EngineKind::Mlx,
            model_id: "mlx-community/Qwen3-ASR-1.7B-4bit".to_string(),
            description: "Fast & light Qwen3 ASR (4-bit). Best for single-speaker, low latency."
                .to_string(),
            capabilities: EngineCapabilities {
                timestamp: true,
                diarization: false,
                emotion_tags: false,
                language_detect: true,
            },
        },
        ModelSpec {
            alias: "qwen3-asr".to_string(),
            engine_kind: EngineKind::Mlx,
            model_id: "mlx-community/Qwen3-ASR-1.7B-8bit".to_string(),
            description: "Qwen3 ASR (8-bit, higher accuracy).".to_string(),
            capabilities: EngineCapabilities {
                timestamp: true,
                diarization: false,
                emotion_tags: false,
                language_detect: true,
            },
        },
        ModelSpec {
            alias: "parakeet".to_string(),
            engine_kind: EngineKind::Mlx,
            model_id: "mlx-community/parakeet-tdt-0.6b-v2".to_string(),
            description: "NVIDIA Parakeet (English only, very fast). Short clips only."
                .to_string(),
            capabilities: EngineCapabilities {
                timestamp: true,
                diarization: false,
                emotion_tags: false,
                language_detect: false,
            },
        },
        ModelSpec {
            alias: "sensevoice-small".to_string(),
            engine_kind: EngineKind::FunAsr,
            model_id: "iic/SenseVoiceSmall".to_string(),
            description: "SenseVoice Small, fastest model (80-85x realtime). Language detection \
                          and emotion tags, but no timestamps or diarization."
                .to_string(),
            capabilities: EngineCapabilities {
                timestamp: false,
                diarization: false,
                emotion_tags: true,
                language_detect: true,
            },
        },
    ];
    specs.sort_by(|a, b| a.alias.cmp(&b.alias));
    specs
});

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(
        "Unknown model: '{0}'. Use GET /v1/models to see built-in models, \
         or pass a full id prefixed with 'mlx-community/' or 'iic/'"
    )]
    UnknownModel(String),
}

/// Resolve a model string to a `ModelSpec`.
///
/// Resolution order:
///   1. Exact alias match (`"paraformer"`, `"qwen3-asr-mini"`)
///   2. Registered model id match (`"mlx-community/Qwen3-ASR-1.7B-4bit"`)
///   3. Prefix-based engine inference for unregistered full ids
///      (`mlx-community/…` is mlx, `iic/…` or anything containing
///      `funasr` is funasr), with the conservative capability set
pub fn lookup(model: &str) -> Result<ModelSpec, RegistryError> {
    if let Some(spec) = REGISTRY.iter().find(|s| s.alias == model) {
        return Ok(spec.clone());
    }
    if let Some(spec) = REGISTRY.iter().find(|s| s.model_id == model) {
        return Ok(spec.clone());
    }

    let inferred = if model.starts_with("mlx-community/") {
        Some(EngineKind::Mlx)
    } else if model.starts_with("iic/") || model.to_lowercase().contains("funasr") {
        Some(EngineKind::FunAsr)
    } else {
        None
    };

    match inferred {
        Some(engine_kind) => Ok(ModelSpec {
            alias: model.to_string(),
            engine_kind,
            model_id: model.to_string(),
            description: "Custom model (not in registry).".to_string(),
            capabilities: EngineCapabilities::conservative(),
        }),
        None => Err(RegistryError::UnknownModel(model.to_string())),
    }
}

/// True if this model value means "use the server's current model".
pub fn is_passthrough(model: Option<&str>) -> bool {
    match model {
        None => true,
        Some(m) => PASSTHROUGH_VALUES.contains(&m),
    }
}

/// All built-in models, sorted by alias.
pub fn list_all() -> &'static [ModelSpec] {
    &REGISTRY
}

/// The registered alias for a model id, if it is a built-in model.
pub fn alias_for(model_id: &str) -> Option<&'static str> {
    REGISTRY
        .iter()
        .find(|s| s.model_id == model_id)
        .map(|s| s.alias.as_str())
}
