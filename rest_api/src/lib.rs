// rest_api/src/lib.rs

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{Method, StatusCode},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use anyhow::Context;

use models::{ProfileUpdate, TouristProfile};

pub mod config;
pub mod errors;
pub mod service;
pub mod storage;

pub use crate::config::RestApiConfig;
pub use crate::errors::ApiError;
use crate::service::{IssuanceService, ProfileService};
use crate::storage::{DigitalIdStore, ProfileStore};

// Shared state for the Axum application. The stores are constructed once
// here and injected; nothing reaches them through globals.
#[derive(Clone)]
pub struct AppState {
    profiles: Arc<ProfileStore>,
    digital_ids: Arc<DigitalIdStore>,
    profile_service: Arc<ProfileService>,
}

impl AppState {
    pub fn new() -> Self {
        let profiles = Arc::new(ProfileStore::new());
        let digital_ids = Arc::new(DigitalIdStore::new());
        let issuance = Arc::new(IssuanceService::new(digital_ids.clone()));
        let profile_service = Arc::new(ProfileService::new(profiles.clone(), issuance));
        AppState {
            profiles,
            digital_ids,
            profile_service,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    // Both optional at the schema level so a missing field surfaces as the
    // contract's 400 message rather than a deserialization rejection.
    pub tourist_id: Option<String>,
    pub full_name: Option<String>,
}

// Handler for the POST /api/login endpoint
async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let tourist_id = payload.tourist_id.unwrap_or_default();
    let full_name = payload.full_name.unwrap_or_default();
    let profile = state.profile_service.login(&tourist_id, &full_name).await?;
    Ok(Json(json!({
        "success": true,
        "profile": profile,
    })))
}

// Handler for the GET /api/profile/:tourist_id endpoint
async fn get_profile_handler(
    State(state): State<AppState>,
    Path(tourist_id): Path<String>,
) -> Result<Json<TouristProfile>, ApiError> {
    let profile = state
        .profiles
        .find_by_tourist_id(&tourist_id)
        .await
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;
    Ok(Json(profile))
}

// Handler for the POST /api/profile/:tourist_id endpoint. Every successful
// call marks the profile complete and triggers digital-ID issuance; the
// response carries the updated profile, not the digital ID.
async fn update_profile_handler(
    State(state): State<AppState>,
    Path(tourist_id): Path<String>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<TouristProfile>, ApiError> {
    let updated = state
        .profile_service
        .complete_profile(&tourist_id, payload)
        .await?;
    Ok(Json(updated))
}

// Handler for the GET /api/digital-id/:tourist_id endpoint. The digital ID
// is merged with a display projection of the owning profile; absence of
// either record is a 404.
async fn get_digital_id_handler(
    State(state): State<AppState>,
    Path(tourist_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let digital_id = state.digital_ids.find_by_tourist_id(&tourist_id).await;
    let profile = state.profiles.find_by_tourist_id(&tourist_id).await;
    let (digital_id, profile) = match (digital_id, profile) {
        (Some(digital_id), Some(profile)) => (digital_id, profile),
        _ => return Err(ApiError::NotFound("Digital ID not found".to_string())),
    };

    let mut body = serde_json::to_value(&digital_id)
        .map_err(|_| ApiError::Internal("Failed to get digital ID".to_string()))?;
    if let Some(object) = body.as_object_mut() {
        object.insert(
            "profile".to_string(),
            json!({
                "fullName": profile.full_name,
                "nationality": profile.nationality,
                "travelerType": profile.traveler_type,
            }),
        );
    }
    Ok(Json(body))
}

// Handler for the /api/health endpoint
async fn health_check_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "message": "Safe Trail API is healthy" })))
}

// Handler for the /api/version endpoint
async fn version_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "version": env!("CARGO_PKG_VERSION"), "api_level": 1 })))
}

/// Builds the application router over the given state.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    Router::new()
        .route("/api/login", post(login_handler))
        .route(
            "/api/profile/:tourist_id",
            get(get_profile_handler).post(update_profile_handler),
        )
        .route("/api/digital-id/:tourist_id", get(get_digital_id_handler))
        .route("/api/health", get(health_check_handler))
        .route("/api/version", get(version_handler))
        .with_state(state)
        .layer(cors)
}

/// Starts the REST API server and runs it until `shutdown_rx` fires.
pub async fn start_server(
    config: &RestApiConfig,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<(), anyhow::Error> {
    let app = app_router(AppState::new());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;
    info!("REST API server listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
            info!("Received shutdown signal.");
        })
        .await
        .context("REST API server failed to start or run")?;

    info!("REST API server stopped.");
    Ok(())
}
