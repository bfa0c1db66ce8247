use std::collections::HashMap;

use serde::Serialize;

use super::{AlertType, FailurePattern, MaintenancePrediction, PredictionPolicy, RiskLevel, SmartAlert};

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionSummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub average_confidence: f64,
    pub total_high_risk_predictions: usize,
    pub avg_days_overdue: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatternSummary {
    pub total: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    pub average_risk_score: f64,
    pub most_common_maintenance_type: String,
    pub shortest_failure_interval: i64,
}

#[derive(Serialize, Clone, Debug, PartialEq, Default)]
pub struct AlertTypeCounts {
    pub prediction: usize,
    pub pattern: usize,
    pub overdue: usize,
    pub critical: usize,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub by_type: AlertTypeCounts,
    pub total_estimated_cost: u64,
    pub total_estimated_downtime: u64,
}

/// Fleet-wide roll-up for the combined predictions endpoint.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    pub total_predictions: usize,
    pub critical_predictions: usize,
    pub high_risk_predictions: usize,
    pub failure_patterns_detected: usize,
    pub high_risk_patterns: usize,
    pub total_alerts: usize,
    pub critical_alerts: usize,
    pub estimated_costs: u64,
    pub estimated_downtime: u64,
}

// Pattern scores from 50 up to the high threshold count as medium risk.
const PATTERN_MEDIUM_SCORE: u32 = 50;

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

fn count_risk(predictions: &[MaintenancePrediction], level: RiskLevel) -> usize {
    predictions.iter().filter(|p| p.risk_level == level).count()
}

pub fn summarize_predictions(predictions: &[MaintenancePrediction]) -> PredictionSummary {
    let total = predictions.len();
    let confidence: f64 = predictions.iter().map(|p| f64::from(p.confidence)).sum();
    let overdue: f64 = predictions
        .iter()
        .filter(|p| p.days_until_overdue < 0)
        .map(|p| p.days_until_overdue.unsigned_abs() as f64)
        .sum();

    let critical = count_risk(predictions, RiskLevel::Critical);
    let high = count_risk(predictions, RiskLevel::High);

    PredictionSummary {
        total,
        critical,
        high,
        medium: count_risk(predictions, RiskLevel::Medium),
        low: count_risk(predictions, RiskLevel::Low),
        average_confidence: mean(confidence, total),
        total_high_risk_predictions: critical + high,
        avg_days_overdue: mean(overdue, total),
    }
}

pub fn summarize_patterns(patterns: &[FailurePattern], policy: &PredictionPolicy) -> PatternSummary {
    let total = patterns.len();
    let score_sum: f64 = patterns.iter().map(|p| f64::from(p.risk_score)).sum();

    // Ties go to the type seen first in ranked order.
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    let mut order: Vec<&'static str> = Vec::new();
    for p in patterns {
        let name = p.maintenance_type.as_str();
        let count = counts.entry(name).or_insert(0);
        if *count == 0 {
            order.push(name);
        }
        *count += 1;
    }
    let best = order.iter().copied().max_by(|a, b| {
        counts[a].cmp(&counts[b]).then_with(|| {
            let pos = |n: &str| order.iter().position(|o| *o == n);
            pos(b).cmp(&pos(a))
        })
    });

    PatternSummary {
        total,
        high_risk: patterns.iter().filter(|p| p.risk_score >= policy.pattern_high_score).count(),
        medium_risk: patterns
            .iter()
            .filter(|p| p.risk_score >= PATTERN_MEDIUM_SCORE && p.risk_score < policy.pattern_high_score)
            .count(),
        low_risk: patterns.iter().filter(|p| p.risk_score < PATTERN_MEDIUM_SCORE).count(),
        average_risk_score: mean(score_sum, total),
        most_common_maintenance_type: best.unwrap_or("None").to_string(),
        shortest_failure_interval: patterns.iter().map(|p| p.avg_days_between_failures).min().unwrap_or(0),
    }
}

pub fn summarize_alerts(alerts: &[SmartAlert]) -> AlertSummary {
    let priority = |n: u8| alerts.iter().filter(|a| a.priority == n).count();
    let mut by_type = AlertTypeCounts::default();
    for alert in alerts {
        match alert.alert_type {
            AlertType::Prediction => by_type.prediction += 1,
            AlertType::Pattern => by_type.pattern += 1,
            AlertType::Overdue => by_type.overdue += 1,
            AlertType::Critical => by_type.critical += 1,
        }
    }

    AlertSummary {
        total: alerts.len(),
        critical: priority(1),
        high: priority(2),
        medium: priority(3),
        low: alerts.iter().filter(|a| a.priority >= 4).count(),
        by_type,
        total_estimated_cost: total_cost(alerts),
        total_estimated_downtime: total_downtime(alerts),
    }
}

pub fn summarize_overall(
    predictions: &[MaintenancePrediction],
    patterns: &[FailurePattern],
    alerts: &[SmartAlert],
    policy: &PredictionPolicy,
) -> OverallSummary {
    OverallSummary {
        total_predictions: predictions.len(),
        critical_predictions: count_risk(predictions, RiskLevel::Critical),
        high_risk_predictions: count_risk(predictions, RiskLevel::High),
        failure_patterns_detected: patterns.len(),
        high_risk_patterns: patterns.iter().filter(|p| p.risk_score >= policy.pattern_high_score).count(),
        total_alerts: alerts.len(),
        critical_alerts: alerts.iter().filter(|a| a.priority == 1).count(),
        estimated_costs: total_cost(alerts),
        estimated_downtime: total_downtime(alerts),
    }
}

fn total_cost(alerts: &[SmartAlert]) -> u64 {
    alerts.iter().filter_map(|a| a.estimated_cost).map(u64::from).sum()
}

fn total_downtime(alerts: &[SmartAlert]) -> u64 {
    alerts.iter().filter_map(|a| a.estimated_downtime).map(u64::from).sum()
}
