// HTTP request handlers
use crate::domain::admin::Admin;
use crate::domain::telemetry::parse_record_time;
use crate::domain::window::WindowSelection;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `{ "status": 200, "data": ... }`
#[derive(Serialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub data: T,
}

#[derive(Deserialize)]
pub struct GraphQuery {
    pub window: Option<String>,
    /// Anchor for "today" and rolling windows; the server clock when absent.
    pub now: Option<String>,
}

async fn ok_json<T: Serialize>(headers: &HeaderMap, data: T) -> Response {
    let envelope = Envelope {
        status: StatusCode::OK.as_u16(),
        data,
    };
    match json_response(StatusCode::OK, &envelope, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full telemetry history of one device
pub async fn get_solar_charger_by_uid(
    Path(uid): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let records = state.device_service.history(&uid).await?;
    Ok(ok_json(&headers, records).await)
}

/// Filtered, bucketed chart data for one device
pub async fn device_graph(
    Path(uid): Path<String>,
    Query(query): Query<GraphQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let selection = match query.window.as_deref() {
        Some(window) => window
            .parse::<WindowSelection>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => WindowSelection::Today,
    };
    let now = match query.now.as_deref() {
        Some(now) => parse_record_time(now)
            .ok_or_else(|| ApiError::BadRequest(format!("invalid now: {now}")))?,
        None => local_now(),
    };

    let snapshot = state.graph_service.graph(&uid, &selection, now).await?;
    Ok(ok_json(&headers, snapshot).await)
}

/// Stream a device history as NDJSON, one record per line
pub async fn stream_records(
    Path(uid): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rx = state.export_service.stream_history(&uid);
    stream_from_receiver(rx)
}

/// Identity of the authenticated admin
pub async fn admin_profile(Extension(admin): Extension<Admin>, headers: HeaderMap) -> Response {
    ok_json(&headers, admin).await
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
