use serde::Serialize;

use crate::domain::{EngineCapabilities, EngineKind, ModelSpec, Segment};

#[derive(Debug, Serialize)]
pub struct TranscriptionResponse {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<SegmentDto>>,
}

#[derive(Debug, Serialize)]
pub struct SegmentDto {
    pub id: usize,
    pub speaker: Option<String>,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl From<&Segment> for SegmentDto {
    fn from(segment: &Segment) -> Self {
        Self {
            id: segment.id,
            speaker: segment.speaker.clone(),
            start: segment.start,
            end: segment.end,
            text: segment.text.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
    pub r#type: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            error: ApiError {
                message: message.into(),
                r#type: error_type.into(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub current: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub alias: String,
    pub model_id: String,
    pub engine_kind: EngineKind,
    pub description: String,
    pub capabilities: EngineCapabilities,
}

impl From<&ModelSpec> for ModelInfo {
    fn from(spec: &ModelSpec) -> Self {
        Self {
            alias: spec.alias.clone(),
            model_id: spec.model_id.clone(),
            engine_kind: spec.engine_kind,
            description: spec.description.clone(),
            capabilities: spec.capabilities,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CurrentModelResponse {
    pub engine_kind: EngineKind,
    pub model_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_alias: Option<String>,
    pub capabilities: EngineCapabilities,
    pub queue_size: usize,
    pub max_queue_size: usize,
    pub state: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub engine_kind: EngineKind,
    pub model: String,
}
