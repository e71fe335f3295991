// Error responses for HTTP handlers
use crate::application::auth_service::AuthError;
use crate::application::graph_service::GraphError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Window(e) => ApiError::BadRequest(e.to_string()),
            GraphError::Repository(e) => ApiError::Internal(e),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::Auth(AuthError::Internal(_)) => (StatusCode::INTERNAL_SERVER_ERROR, None),
            ApiError::Auth(e) => (StatusCode::UNAUTHORIZED, e.code()),
            ApiError::Internal(e) => {
                tracing::error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let body = ErrorBody {
            status: status.as_u16(),
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
