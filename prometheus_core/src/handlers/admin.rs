//! Admin login, lead listing and content override management

use axum::{extract::State, Extension, Json};
use serde_json::Value;
use tracing::{info, warn};

use crate::auth::AdminAccess;
use crate::error::Result;
use crate::extractors::ApiJson;
use crate::models::{AdminContentResponse, LeadsResponse, LoginRequest, LoginResponse};
use crate::AppState;

pub async fn handle_login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let session = state.auth_service.login(request.password.as_deref())?;

    Ok(Json(LoginResponse {
        success: true,
        expires_at: session.expires_at_iso(),
        token: session.token,
    }))
}

pub async fn handle_list_leads(
    State(state): State<AppState>,
    Extension(access): Extension<AdminAccess>,
) -> Json<LeadsResponse> {
    let leads = state.leads.list().await;
    info!(count = leads.len(), ?access, "Listing leads");

    Json(LeadsResponse {
        success: true,
        leads,
    })
}

pub async fn handle_get_content(State(state): State<AppState>) -> Json<AdminContentResponse> {
    let overrides = state.overrides.get().await;
    let content = state.content.with_overrides(&overrides);

    Json(AdminContentResponse {
        success: true,
        overrides,
        content,
    })
}

/// Replaces all overrides. A failed file write is logged only; the new overrides are
/// already live in memory.
pub async fn handle_replace_content(
    State(state): State<AppState>,
    Extension(access): Extension<AdminAccess>,
    ApiJson(raw): ApiJson<Value>,
) -> Json<AdminContentResponse> {
    let persisted = state.overrides.replace(&raw).await;
    if let Err(err) = &persisted.write {
        warn!("Content overrides kept in memory only: {}", err);
    }

    info!(?access, "Content overrides updated");
    let overrides = persisted.into_value();
    let content = state.content.with_overrides(&overrides);

    Json(AdminContentResponse {
        success: true,
        overrides,
        content,
    })
}
