pub mod alerts;
pub mod fleet;
pub mod maintenance;
pub mod patterns;
pub mod predictions;
pub mod stats;

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::analytics::PredictionPolicy;
use crate::services::fleet_source::SeaOrmFleetSource;

/// Shared per-request state: the database handle and the immutable policy.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub policy: Arc<PredictionPolicy>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, policy: PredictionPolicy) -> Self {
        Self { db, policy: Arc::new(policy) }
    }

    pub fn source(&self) -> SeaOrmFleetSource {
        SeaOrmFleetSource::new(self.db.clone())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route(
            "/api/ai/predictions",
            get(predictions::get_predictions).post(predictions::refresh_predictions),
        )
        .route("/api/ai/maintenance", get(maintenance::get_maintenance))
        .route("/api/ai/patterns", get(patterns::get_patterns))
        .route("/api/ai/alerts", get(alerts::get_alerts))
        .route("/api/v1/stats", get(stats::get_stats))
        .route("/api/v1/trainsets", post(fleet::register_trainset).get(fleet::list_trainsets))
        .route("/api/v1/job-cards", post(fleet::log_job_card).get(fleet::list_job_cards))
        .route("/api/v1/job-cards/{id}/close", post(fleet::close_job_card))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Success envelope shared by every endpoint.
pub(crate) fn envelope(data: Value, message: impl Into<String>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": data,
        "message": message.into(),
    }))
}

/// A numeric query filter taken as raw text. Input that does not parse
/// matches nothing instead of rejecting the request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum NumberFilter<T> {
    Absent,
    Value(T),
    Invalid,
}

impl<T: FromStr> NumberFilter<T> {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Self::Absent,
            Some(s) => s.parse().map_or(Self::Invalid, Self::Value),
        }
    }
}

impl NumberFilter<usize> {
    /// Result size cap: the default when absent, zero when invalid.
    pub fn limit(self, default: usize) -> usize {
        match self {
            Self::Absent => default,
            Self::Value(n) => n,
            Self::Invalid => 0,
        }
    }
}

pub(crate) fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339()
}

async fn root() -> Json<Value> {
    Json(json!({
        "system": "KMRL Fleet Backend",
        "status": "operational",
        "modules": {
            "predictions": "active",
            "patterns": "active",
            "alerts": "active",
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
