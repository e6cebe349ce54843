use axum::{extract::State, Json};
use chrono::Utc;

use crate::auth::session::format_millis;
use crate::models::HealthResponse;
use crate::AppState;

pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: state.app_name.clone(),
        timestamp: format_millis(Utc::now()),
    })
}
