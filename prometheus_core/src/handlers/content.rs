//! Public content endpoints

use axum::{extract::State, Json};

use crate::content::{PricingPlan, SiteContent};
use crate::AppState;

/// Baseline content with the current admin overrides applied.
pub async fn handle_content(State(state): State<AppState>) -> Json<SiteContent> {
    Json(state.current_content().await)
}

pub async fn handle_pricing(State(state): State<AppState>) -> Json<Vec<PricingPlan>> {
    Json(state.current_content().await.pricing)
}
