use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::analytics::summary::summarize_alerts;
use crate::analytics::{generate_smart_alerts, AlertType};
use crate::api::{envelope, timestamp, AppState, NumberFilter};

const DEFAULT_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct AlertQuery {
    pub priority: Option<String>,
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    pub limit: Option<String>,
}

pub async fn get_alerts(State(state): State<AppState>, Query(query): Query<AlertQuery>) -> Json<Value> {
    let now = Utc::now();
    tracing::info!("Generating smart alerts...");

    let mut alerts = generate_smart_alerts(&state.source(), &state.policy, now.naive_utc()).await;

    match NumberFilter::<u8>::parse(query.priority.as_deref()) {
        NumberFilter::Absent => {}
        NumberFilter::Value(priority) => alerts.retain(|a| a.priority == priority),
        NumberFilter::Invalid => alerts.clear(),
    }
    if let Some(raw) = query.alert_type.as_deref().filter(|s| !s.trim().is_empty()) {
        let wanted = AlertType::parse(raw);
        alerts.retain(|a| Some(a.alert_type) == wanted);
    }
    alerts.truncate(NumberFilter::<usize>::parse(query.limit.as_deref()).limit(DEFAULT_LIMIT));

    let summary = summarize_alerts(&alerts);
    let message = format!("Generated {} smart alerts", alerts.len());

    envelope(
        json!({
            "alerts": alerts,
            "summary": summary,
            "generatedAt": timestamp(now),
        }),
        message,
    )
}
