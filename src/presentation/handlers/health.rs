use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::presentation::state::AppState;

use super::openai_types::HealthResponse;

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let spec = state.scheduler.current_spec();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            engine_kind: spec.engine_kind,
            model: spec.model_id,
        }),
    )
}
