//! Route table for the public, admin and assistant endpoints

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::{admin, ai, contact, content, health};
use crate::error::AppError;
use crate::middleware::require_admin;
use crate::AppState;

pub fn create_routes(state: AppState) -> Router<AppState> {
    // The guard is a route layer so unauthorized calls never reach body extraction.
    let admin_routes = Router::new()
        .route("/api/admin/leads", get(admin::handle_list_leads))
        .route(
            "/api/admin/content",
            get(admin::handle_get_content).put(admin::handle_replace_content),
        )
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .route("/api/health", get(health::handle_health))
        .route("/api/content", get(content::handle_content))
        .route("/api/pricing", get(content::handle_pricing))
        .route("/api/contact", post(contact::handle_contact))
        .route("/api/admin/login", post(admin::handle_login))
        .route("/api/ai/capabilities", get(ai::handle_capabilities))
        .route("/api/ai/tutor", post(ai::handle_tutor))
        .route("/api/ai/guide", post(ai::handle_guide))
        .route("/api/ai/rewrite", post(ai::handle_rewrite))
        .route("/api/ai/next-course", post(ai::handle_next_course))
        .merge(admin_routes)
        .fallback(handle_not_found)
}

async fn handle_not_found() -> AppError {
    AppError::NotFound("Not found.".to_string())
}
