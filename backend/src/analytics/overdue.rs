use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use super::interval::estimate_interval;
use super::{days_between, FleetDataSource, JobCardRecord, JobStatus, PredictionPolicy, TrainsetRecord};
use crate::error::FleetError;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// Case-insensitive parse of `LOW`, `MEDIUM`, `HIGH`, `CRITICAL`.
    pub fn parse(s: &str) -> Option<Self> {
        [Self::Low, Self::Medium, Self::High, Self::Critical]
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaintenancePrediction {
    pub trainset_id: i32,
    pub train_id: String,
    pub predicted_overdue_date: NaiveDateTime,
    pub days_until_overdue: i64,
    pub confidence: u32,
    pub risk_level: RiskLevel,
    pub recommendation: String,
    pub factors: Vec<String>,
}

/// Projects the next maintenance due date of every active trainset.
///
/// Read failures are logged and yield an empty list, which callers must read
/// as "predictions unavailable" rather than "fleet healthy".
pub async fn predict_maintenance_overdue<S: FleetDataSource>(
    source: &S,
    policy: &PredictionPolicy,
    now: NaiveDateTime,
) -> Vec<MaintenancePrediction> {
    match try_predict(source, policy, now).await {
        Ok(predictions) => predictions,
        Err(e) => {
            tracing::error!("Error predicting maintenance overdue: {}", e);
            Vec::new()
        }
    }
}

async fn try_predict<S: FleetDataSource>(
    source: &S,
    policy: &PredictionPolicy,
    now: NaiveDateTime,
) -> Result<Vec<MaintenancePrediction>, FleetError> {
    let trainsets = source.list_active_trainsets().await?;
    let mut predictions = Vec::with_capacity(trainsets.len());

    for train in &trainsets {
        let history = source.list_job_cards(train.trainset_id, policy.history_limit).await?;
        if let Some(prediction) = predict_for_trainset(train, &history, policy, now) {
            predictions.push(prediction);
        }
    }

    predictions.sort_by_key(|p| p.days_until_overdue);
    tracing::debug!("Generated {} maintenance predictions", predictions.len());
    Ok(predictions)
}

/// Prediction for one trainset from its recent history (newest first).
/// `None` when there is no history or no date to project from.
pub fn predict_for_trainset(
    train: &TrainsetRecord,
    history: &[JobCardRecord],
    policy: &PredictionPolicy,
    now: NaiveDateTime,
) -> Option<MaintenancePrediction> {
    if history.is_empty() {
        return None;
    }

    let closed: Vec<JobCardRecord> = history
        .iter()
        .filter(|c| c.status == JobStatus::Closed)
        .cloned()
        .collect();
    let interval = estimate_interval(&closed, policy);

    let last_maintenance = closed
        .first()
        .and_then(|c| c.closed_date)
        .or(train.last_service_date)?;

    let predicted = last_maintenance + Duration::days(interval);
    let days_until_overdue = days_between(predicted, now).ceil() as i64;

    let risk_level = risk_level(days_until_overdue, policy);

    Some(MaintenancePrediction {
        trainset_id: train.trainset_id,
        train_id: train.serial_no.clone(),
        predicted_overdue_date: predicted,
        days_until_overdue,
        confidence: confidence(history.len(), interval, policy),
        risk_level,
        recommendation: recommendation(risk_level, days_until_overdue),
        factors: factors(train, history, interval, policy, now),
    })
}

pub fn risk_level(days_until_overdue: i64, policy: &PredictionPolicy) -> RiskLevel {
    if days_until_overdue <= policy.critical_max_days {
        RiskLevel::Critical
    } else if days_until_overdue <= policy.high_max_days {
        RiskLevel::High
    } else if days_until_overdue <= policy.medium_max_days {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn confidence(history_len: usize, interval_days: i64, policy: &PredictionPolicy) -> u32 {
    let consistent = (policy.consistent_interval_min_days..=policy.consistent_interval_max_days)
        .contains(&interval_days);
    let base = if consistent {
        policy.consistent_base_confidence
    } else {
        policy.inconsistent_base_confidence
    };

    let records = u32::try_from(history_len).unwrap_or(u32::MAX);
    let data = records
        .saturating_mul(policy.confidence_per_record)
        .min(policy.max_history_confidence);

    base.saturating_add(data).min(policy.max_confidence)
}

fn factors(
    train: &TrainsetRecord,
    history: &[JobCardRecord],
    interval_days: i64,
    policy: &PredictionPolicy,
    now: NaiveDateTime,
) -> Vec<String> {
    let mut factors = Vec::new();

    if train.mileage_km > policy.high_mileage_km {
        factors.push(format!("High mileage ({} km)", train.mileage_km));
    }

    if history.len() >= policy.rich_history_records {
        factors.push(format!("Rich maintenance history ({} records)", history.len()));
    }

    if interval_days < policy.frequent_interval_days {
        factors.push(format!("Frequent maintenance pattern (avg {} days)", interval_days));
    }

    let window = policy.recent_activity_window_days as f64;
    let recent = history
        .iter()
        .filter(|c| days_between(now, c.raised_date) <= window)
        .count();
    if recent >= policy.recent_activity_min_cards {
        factors.push(format!(
            "Recent maintenance activity ({} in last {} months)",
            recent,
            policy.recent_activity_window_days / 30
        ));
    }

    factors
}

fn recommendation(level: RiskLevel, days_until_overdue: i64) -> String {
    match level {
        RiskLevel::Critical => {
            "IMMEDIATE ACTION REQUIRED: Schedule emergency maintenance within 24 hours.".to_string()
        }
        RiskLevel::High => format!(
            "Schedule maintenance within {} days to prevent service disruption.",
            days_until_overdue.max(1)
        ),
        RiskLevel::Medium => "Plan maintenance in next scheduling window. Monitor closely.".to_string(),
        RiskLevel::Low => "Continue regular monitoring. No immediate action required.".to_string(),
    }
}
