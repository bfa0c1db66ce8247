use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::classify::{classify, MaintenanceType};
use super::interval::average_gap;
use super::policy::ScoreBand;
use super::{days_between, FleetDataSource, FleetJobCard, PredictionPolicy};
use crate::error::FleetError;

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailurePattern {
    pub trainset_id: i32,
    pub train_id: String,
    pub maintenance_type: MaintenanceType,
    pub failure_count: usize,
    pub avg_days_between_failures: i64,
    pub last_failure_date: NaiveDateTime,
    pub risk_score: u32,
    pub recommendation: String,
}

/// Finds recurring maintenance issues of the same type on the same trainset.
///
/// Read failures are logged and yield an empty list.
pub async fn detect_failure_patterns<S: FleetDataSource>(
    source: &S,
    policy: &PredictionPolicy,
    now: NaiveDateTime,
) -> Vec<FailurePattern> {
    match source.list_fleet_job_cards().await {
        Ok(cards) => {
            let patterns = patterns_from_cards(&cards, policy, now);
            tracing::debug!("Detected {} failure patterns", patterns.len());
            patterns
        }
        Err(e) => {
            tracing::error!("Error detecting failure patterns: {}", e);
            Vec::new()
        }
    }
}

pub fn patterns_from_cards(
    cards: &[FleetJobCard],
    policy: &PredictionPolicy,
    now: NaiveDateTime,
) -> Vec<FailurePattern> {
    // 1. GROUP by (trainset, inferred type)
    let mut groups: BTreeMap<(i32, MaintenanceType), Vec<&FleetJobCard>> = BTreeMap::new();
    for record in cards {
        let kind = classify(&record.card.description);
        groups.entry((record.card.trainset_id, kind)).or_default().push(record);
    }

    // 2. SCORE each group with enough history
    let mut patterns: Vec<FailurePattern> = groups
        .into_iter()
        .filter(|(_, records)| records.len() >= policy.pattern_min_records)
        .filter_map(|((trainset_id, kind), records)| score_group(trainset_id, kind, &records, policy, now))
        .filter(|p| p.risk_score >= policy.pattern_min_score)
        .collect();

    // 3. RANK most concerning first
    patterns.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
    patterns
}

fn score_group(
    trainset_id: i32,
    kind: MaintenanceType,
    records: &[&FleetJobCard],
    policy: &PredictionPolicy,
    now: NaiveDateTime,
) -> Option<FailurePattern> {
    let mut dates: Vec<NaiveDateTime> = records.iter().map(|r| r.card.raised_date).collect();
    dates.sort_by(|a, b| b.cmp(a));

    let avg_gap = average_gap(&dates);
    let last_failure = *dates.first()?;
    let failure_count = records.len();
    let risk_score = risk_score(failure_count, avg_gap, last_failure, policy, now);

    Some(FailurePattern {
        trainset_id,
        train_id: records[0].serial_no.clone(),
        maintenance_type: kind,
        failure_count,
        avg_days_between_failures: avg_gap,
        last_failure_date: last_failure,
        risk_score,
        recommendation: recommendation(kind, failure_count, risk_score, policy),
    })
}

pub fn risk_score(
    failure_count: usize,
    avg_gap_days: i64,
    last_failure: NaiveDateTime,
    policy: &PredictionPolicy,
    now: NaiveDateTime,
) -> u32 {
    let count = u32::try_from(failure_count).unwrap_or(u32::MAX);

    let frequency = count
        .saturating_mul(policy.frequency_points_per_failure)
        .min(policy.frequency_points_cap);
    let interval = ScoreBand::score(&policy.interval_bands, avg_gap_days as f64);
    let recency = ScoreBand::score(&policy.recency_bands, days_between(now, last_failure));
    let consistency = if failure_count >= policy.consistency_min_failures
        && avg_gap_days < policy.consistency_max_gap_days
    {
        policy.consistency_bonus
    } else {
        0
    };

    (frequency + interval + recency + consistency).min(policy.max_risk_score)
}

fn recommendation(kind: MaintenanceType, count: usize, risk: u32, policy: &PredictionPolicy) -> String {
    if risk >= policy.pattern_critical_score {
        format!(
            "CRITICAL: Consider immediate component replacement for {} system. {} failures in short timeframe indicates systemic failure.",
            kind, count
        )
    } else if risk >= policy.pattern_high_score {
        format!(
            "HIGH PRIORITY: Investigate root cause of recurring {} failures. Consider upgrading components or maintenance procedures.",
            kind
        )
    } else {
        format!("Monitor {} system closely. Pattern detected but not yet critical.", kind)
    }
}
