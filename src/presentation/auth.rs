// Bearer-token middleware for admin routes
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Resolve the admin behind the `Authorization` header and attach it as an
/// [`Admin`](crate::domain::admin::Admin) extension.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let admin = state
        .auth_service
        .authenticate(authorization.as_deref())
        .await?;
    tracing::debug!("Admin {} authenticated", admin.username);

    request.extensions_mut().insert(admin);
    Ok(next.run(request).await)
}
