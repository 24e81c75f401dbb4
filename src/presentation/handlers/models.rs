use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::domain::registry;
use crate::presentation::state::AppState;

use super::openai_types::{CurrentModelResponse, ModelInfo, ModelsResponse};

/// The registry, plus which alias is currently loaded (`null` when the
/// loaded model is off-registry).
pub async fn models_handler(State(state): State<AppState>) -> impl IntoResponse {
    let current = state.scheduler.current_spec();
    (
        StatusCode::OK,
        Json(ModelsResponse {
            models: registry::list_all().iter().map(ModelInfo::from).collect(),
            current: registry::alias_for(&current.model_id).map(String::from),
        }),
    )
}

/// The currently loaded model, its capabilities, and queue pressure.
/// Lets clients discover what formats are available before uploading.
pub async fn current_model_handler(State(state): State<AppState>) -> impl IntoResponse {
    let spec = state.scheduler.current_spec();
    (
        StatusCode::OK,
        Json(CurrentModelResponse {
            engine_kind: spec.engine_kind,
            model_alias: registry::alias_for(&spec.model_id).map(String::from),
            model_id: spec.model_id,
            capabilities: spec.capabilities,
            queue_size: state.scheduler.queue_depth(),
            max_queue_size: state.scheduler.max_queue_size(),
            state: state.scheduler.state().as_str(),
        }),
    )
}
