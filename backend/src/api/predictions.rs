use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::analytics::summary::summarize_overall;
use crate::analytics::{detect_failure_patterns, generate_smart_alerts, predict_maintenance_overdue};
use crate::api::{envelope, timestamp, AppState};

#[derive(Deserialize)]
pub struct PredictionQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Combined view: `type` selects `maintenance`, `patterns`, `alerts` or
/// `all` (the default, which also adds an overall summary).
pub async fn get_predictions(
    State(state): State<AppState>,
    Query(query): Query<PredictionQuery>,
) -> Json<Value> {
    let now = Utc::now();
    let kind = query.kind.unwrap_or_else(|| "all".to_string());
    let wants = |section: &str| kind == "all" || kind == section;
    tracing::info!("Generating AI predictions for type: {}", kind);

    let source = state.source();
    let policy = &state.policy;
    let today = now.naive_utc();

    let mut data = Map::new();
    data.insert("timestamp".into(), json!(timestamp(now)));
    data.insert("type".into(), json!(kind));

    let predictions = if wants("maintenance") {
        Some(predict_maintenance_overdue(&source, policy, today).await)
    } else {
        None
    };
    let patterns = if wants("patterns") {
        Some(detect_failure_patterns(&source, policy, today).await)
    } else {
        None
    };
    let alerts = if wants("alerts") {
        Some(generate_smart_alerts(&source, policy, today).await)
    } else {
        None
    };

    if let Some(p) = &predictions {
        data.insert("maintenancePredictions".into(), json!(p));
    }
    if let Some(p) = &patterns {
        data.insert("failurePatterns".into(), json!(p));
    }
    if let Some(a) = &alerts {
        data.insert("smartAlerts".into(), json!(a));
    }

    if kind == "all" {
        let summary = summarize_overall(
            predictions.as_deref().unwrap_or_default(),
            patterns.as_deref().unwrap_or_default(),
            alerts.as_deref().unwrap_or_default(),
            policy,
        );
        data.insert("summary".into(), json!(summary));
    }

    envelope(Value::Object(data), "AI predictions generated successfully")
}

/// Recomputes alerts on demand, e.g. from a scheduler.
pub async fn refresh_predictions(State(state): State<AppState>) -> Json<Value> {
    let now = Utc::now();
    tracing::info!("Triggering AI prediction update...");

    let alerts = generate_smart_alerts(&state.source(), &state.policy, now.naive_utc()).await;

    Json(json!({
        "success": true,
        "message": "AI predictions updated successfully",
        "alertsGenerated": alerts.len(),
        "timestamp": timestamp(now),
    }))
}
