// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::auth::require_admin;
use crate::presentation::handlers::{
    admin_profile, device_graph, get_solar_charger_by_uid, health_check, stream_records,
};
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/admin/profile", get(admin_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/healthz", get(health_check))
        .route("/getSolarChargerByUID/:uid", get(get_solar_charger_by_uid))
        .route("/devices/:uid/graph", get(device_graph))
        .route("/devices/:uid/records/stream", get(stream_records))
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
