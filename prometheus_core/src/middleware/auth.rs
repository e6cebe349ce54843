use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::AppState;

/// Guards admin routes; runs before any body extraction.
///
/// On success the [`crate::auth::AdminAccess`] is stored in the request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let access = state.auth_service.authorize(request.headers())?;
    tracing::debug!(?access, path = %request.uri().path(), "Admin request authorized");

    request.extensions_mut().insert(access);
    Ok(next.run(request).await)
}
