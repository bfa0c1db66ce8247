use chrono::NaiveDateTime;
use serde::Serialize;

use super::{
    days_between, detect_failure_patterns, predict_maintenance_overdue, FailurePattern, FleetDataSource,
    FleetJobCard, JobStatus, MaintenancePrediction, PredictionPolicy, RiskLevel,
};

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertType {
    Prediction,
    Pattern,
    Overdue,
    Critical,
}

impl AlertType {
    pub const ALL: [AlertType; 4] = [Self::Prediction, Self::Pattern, Self::Overdue, Self::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prediction => "PREDICTION",
            Self::Pattern => "PATTERN",
            Self::Overdue => "OVERDUE",
            Self::Critical => "CRITICAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SmartAlert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub priority: u8, // 1 (most urgent) ..= 5
    pub title: String,
    pub message: String,
    pub trainset_id: i32,
    pub action_required: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<u32>, // rupees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_downtime: Option<u32>, // hours
}

/// Merges predictions, failure patterns and long-open job cards into one
/// list, most urgent first. A trainset may appear in several alerts.
///
/// Prediction and pattern read failures drop that source only; a failure
/// reading open job cards is logged and yields an empty list.
pub async fn generate_smart_alerts<S: FleetDataSource>(
    source: &S,
    policy: &PredictionPolicy,
    now: NaiveDateTime,
) -> Vec<SmartAlert> {
    let predictions = predict_maintenance_overdue(source, policy, now).await;
    let patterns = detect_failure_patterns(source, policy, now).await;

    let cards = match source.list_fleet_job_cards().await {
        Ok(cards) => cards,
        Err(e) => {
            tracing::error!("Error generating smart alerts: {}", e);
            return Vec::new();
        }
    };

    let alerts = merge_alerts(&predictions, &patterns, &cards, policy, now);
    tracing::debug!("Generated {} smart alerts", alerts.len());
    alerts
}

pub fn merge_alerts(
    predictions: &[MaintenancePrediction],
    patterns: &[FailurePattern],
    cards: &[FleetJobCard],
    policy: &PredictionPolicy,
    now: NaiveDateTime,
) -> Vec<SmartAlert> {
    let mut alerts: Vec<SmartAlert> = predictions
        .iter()
        .filter_map(|p| prediction_alert(p, policy))
        .chain(patterns.iter().filter_map(|p| pattern_alert(p, policy)))
        .chain(cards.iter().filter_map(|c| overdue_alert(c, policy, now)))
        .collect();

    // stable: equal priorities keep prediction, pattern, overdue order
    alerts.sort_by_key(|a| a.priority);
    alerts
}

fn prediction_alert(p: &MaintenancePrediction, policy: &PredictionPolicy) -> Option<SmartAlert> {
    let critical = p.risk_level == RiskLevel::Critical;
    if !critical && p.days_until_overdue > policy.prediction_alert_max_days {
        return None;
    }

    Some(SmartAlert {
        alert_type: AlertType::Prediction,
        priority: if critical { 1 } else { 2 },
        title: format!("Maintenance Overdue Prediction: {}", p.train_id),
        message: format!(
            "Train {} is predicted to be overdue for maintenance in {} days. {}",
            p.train_id, p.days_until_overdue, p.recommendation
        ),
        trainset_id: p.trainset_id,
        action_required: "Schedule maintenance immediately".to_string(),
        estimated_cost: Some(policy.costs.for_risk(p.risk_level)),
        estimated_downtime: Some(policy.prediction_downtime_hours),
    })
}

fn pattern_alert(p: &FailurePattern, policy: &PredictionPolicy) -> Option<SmartAlert> {
    if p.risk_score < policy.pattern_high_score {
        return None;
    }

    Some(SmartAlert {
        alert_type: AlertType::Pattern,
        priority: if p.risk_score >= policy.pattern_critical_score { 1 } else { 2 },
        title: format!("Recurring Failure Pattern: {}", p.train_id),
        message: format!(
            "Train {} has recurring {} issues ({} incidents, avg {} days apart). {}",
            p.train_id, p.maintenance_type, p.failure_count, p.avg_days_between_failures, p.recommendation
        ),
        trainset_id: p.trainset_id,
        action_required: "Investigate root cause and consider component replacement".to_string(),
        estimated_cost: Some(policy.pattern_cost()),
        estimated_downtime: Some(policy.pattern_downtime_hours),
    })
}

fn overdue_alert(record: &FleetJobCard, policy: &PredictionPolicy, now: NaiveDateTime) -> Option<SmartAlert> {
    if record.card.status != JobStatus::Open {
        return None;
    }

    let days_open = days_between(now, record.card.raised_date).floor() as i64;
    if days_open <= policy.overdue_job_days {
        return None;
    }

    Some(SmartAlert {
        alert_type: AlertType::Overdue,
        priority: if days_open > policy.overdue_critical_days { 1 } else { 2 },
        title: format!("Overdue Maintenance: {}", record.serial_no),
        message: format!(
            "Maintenance job for {} has been open for {} days: {}",
            record.serial_no, days_open, record.card.description
        ),
        trainset_id: record.card.trainset_id,
        action_required: "Complete maintenance immediately".to_string(),
        estimated_cost: Some(policy.costs.high),
        estimated_downtime: Some(policy.overdue_downtime_hours),
    })
}
