//! Axum-based HTTP API over the settings store

use crate::error::TariffError;
use crate::preferences::PreferencesUpdate;
use crate::tariff::{OffPeakSettings, TariffGroup, TariffSettingsStore, tariff_for_hour};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{Timelike, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<TariffSettingsStore>>,
    /// Zone used when a rate is requested without an explicit hour
    pub timezone: Tz,
}

impl AppState {
    pub fn new(store: TariffSettingsStore, timezone: Tz) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            timezone,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RateParams {
    pub hour: Option<u8>,
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn save_failed(err: &TariffError) -> (StatusCode, Json<Value>) {
    crate::logging::get_logger("web").error(&format!("Saving settings failed: {}", err));
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
}

fn ok() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "ok": true })))
}

pub(crate) async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn get_settings(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.lock().await;
    Json(store.get_off_peak_settings())
}

pub(crate) async fn put_settings(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let Ok(settings) = serde_json::from_value::<OffPeakSettings>(body) else {
        return bad_request("bad request");
    };
    let mut store = state.store.lock().await;
    match store.save_off_peak_settings(&settings) {
        Ok(()) => ok(),
        Err(e) => save_failed(&e),
    }
}

pub(crate) async fn get_groups(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.lock().await;
    Json(store.get_tariff_groups())
}

pub(crate) async fn put_groups(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let Ok(groups) = serde_json::from_value::<Vec<TariffGroup>>(body) else {
        return bad_request("bad request");
    };
    let mut store = state.store.lock().await;
    match store.save_tariff_groups(&groups) {
        Ok(()) => ok(),
        Err(e) => save_failed(&e),
    }
}

pub(crate) async fn rate(
    State(state): State<AppState>,
    Query(params): Query<RateParams>,
) -> impl IntoResponse {
    #[allow(clippy::cast_possible_truncation)]
    let hour = params
        .hour
        .unwrap_or_else(|| Utc::now().with_timezone(&state.timezone).hour() as u8);
    if hour > 23 {
        return bad_request("hour must be between 0 and 23");
    }

    let groups = state.store.lock().await.get_tariff_groups();
    let matched = tariff_for_hour(hour, &groups);
    (
        StatusCode::OK,
        Json(json!({
            "hour": hour,
            "rate": matched.map_or(0.0, |g| g.rate),
            "isOffPeak": matched.is_some_and(|g| g.is_off_peak),
            "group": matched,
        })),
    )
}

pub(crate) async fn get_preferences(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.lock().await;
    Json(store.get_preferences())
}

/// Partial update; on a failed write nothing from the body is kept
pub(crate) async fn put_preferences(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let Ok(update) = serde_json::from_value::<PreferencesUpdate>(body) else {
        return bad_request("bad request");
    };
    let mut store = state.store.lock().await;
    match store.update_preferences(&update) {
        Ok(()) => (StatusCode::OK, Json(json!(store.get_preferences()))),
        Err(e) => save_failed(&e),
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/tariff/settings", get(get_settings).put(put_settings))
        .route("/api/tariff/groups", get(get_groups).put(put_groups))
        .route("/api/tariff/rate", get(rate))
        .route("/api/preferences", get(get_preferences).put(put_preferences))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind `host:port` and serve the API until the server stops
///
/// Bind and accept-loop failures are reported as [`TariffError::Web`].
pub async fn serve(state: AppState, host: &str, port: u16) -> crate::error::Result<()> {
    let router = build_router(state);

    let logger = crate::logging::get_logger("web");
    logger.info(&format!(
        "Starting web server; requested host={}, port={}",
        host, port
    ));

    let addr = match host.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, port),
        Err(_) => {
            logger.warn(&format!("Invalid host '{}'; falling back to 127.0.0.1", host));
            ([127, 0, 0, 1], port).into()
        }
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TariffError::web(format!("Failed to bind {}: {}", addr, e)))?;
    let local_addr = listener.local_addr()?;
    logger.info(&format!(
        "Web server listening at http://{}:{} (API /api)",
        local_addr.ip(),
        local_addr.port()
    ));

    axum::serve(listener, router)
        .await
        .map_err(|e| TariffError::web(e.to_string()))
}
