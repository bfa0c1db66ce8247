use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::analytics::summary::summarize_predictions;
use crate::analytics::{predict_maintenance_overdue, RiskLevel};
use crate::api::{envelope, timestamp, AppState, NumberFilter};

const DEFAULT_LIMIT: usize = 50;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceQuery {
    pub risk_level: Option<String>,
    pub limit: Option<String>,
}

pub async fn get_maintenance(
    State(state): State<AppState>,
    Query(query): Query<MaintenanceQuery>,
) -> Json<Value> {
    let now = Utc::now();
    tracing::info!("Generating maintenance predictions...");

    let mut predictions = predict_maintenance_overdue(&state.source(), &state.policy, now.naive_utc()).await;

    if let Some(raw) = query.risk_level.as_deref().filter(|s| !s.trim().is_empty()) {
        let level = RiskLevel::parse(raw);
        predictions.retain(|p| Some(p.risk_level) == level);
    }
    predictions.truncate(NumberFilter::<usize>::parse(query.limit.as_deref()).limit(DEFAULT_LIMIT));

    let summary = summarize_predictions(&predictions);
    let message = format!("Generated {} maintenance predictions", predictions.len());

    envelope(
        json!({
            "predictions": predictions,
            "summary": summary,
            "generatedAt": timestamp(now),
        }),
        message,
    )
}
