use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::analytics::detect_failure_patterns;
use crate::analytics::summary::summarize_patterns;
use crate::api::{envelope, timestamp, AppState, NumberFilter};

const DEFAULT_LIMIT: usize = 50;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternQuery {
    pub min_risk_score: Option<String>,
    pub limit: Option<String>,
}

pub async fn get_patterns(State(state): State<AppState>, Query(query): Query<PatternQuery>) -> Json<Value> {
    let now = Utc::now();
    tracing::info!("Detecting failure patterns...");

    let mut patterns = detect_failure_patterns(&state.source(), &state.policy, now.naive_utc()).await;

    match NumberFilter::<u32>::parse(query.min_risk_score.as_deref()) {
        NumberFilter::Absent | NumberFilter::Value(0) => {}
        NumberFilter::Value(min) => patterns.retain(|p| p.risk_score >= min),
        NumberFilter::Invalid => patterns.clear(),
    }
    patterns.truncate(NumberFilter::<usize>::parse(query.limit.as_deref()).limit(DEFAULT_LIMIT));

    let summary = summarize_patterns(&patterns, &state.policy);
    let message = format!("Detected {} failure patterns", patterns.len());

    envelope(
        json!({
            "patterns": patterns,
            "summary": summary,
            "generatedAt": timestamp(now),
        }),
        message,
    )
}
