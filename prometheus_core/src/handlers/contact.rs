use axum::{extract::State, http::StatusCode, Json};
use tracing::warn;

use crate::content::whatsapp::{lead_whatsapp_message, whatsapp_url};
use crate::error::{AppError, Result};
use crate::extractors::ApiJson;
use crate::models::ContactResponse;
use crate::validation::ContactPayload;
use crate::AppState;

pub const CONTACT_SUCCESS_MESSAGE: &str =
    "Votre demande a bien ete envoyee. Vous pouvez maintenant poursuivre sur WhatsApp.";

/// Validates and stores a lead, then returns the WhatsApp hand-off link.
///
/// A failed file write is logged only; the lead is kept in memory and the visitor still
/// gets a 201.
pub async fn handle_contact(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ContactPayload>,
) -> Result<(StatusCode, Json<ContactResponse>)> {
    let content = state.current_content().await;
    let draft = payload
        .validate(&content.reservation)
        .map_err(AppError::Validation)?;

    let persisted = state.leads.add(draft).await;
    if let Err(err) = &persisted.write {
        warn!(lead_id = persisted.value.id, "Lead kept in memory only: {}", err);
    }
    let lead = persisted.into_value();

    let whatsapp_url = whatsapp_url(&content, &lead_whatsapp_message(&content, &lead));

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            success: true,
            message: CONTACT_SUCCESS_MESSAGE.to_string(),
            lead,
            whatsapp_url,
        }),
    ))
}
