use super::RiskLevel;

/// Adds `points` when the measured value is strictly below `below_days`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreBand {
    pub below_days: i64,
    pub points: u32,
}

impl ScoreBand {
    pub const fn new(below_days: i64, points: u32) -> Self {
        Self { below_days, points }
    }

    /// Points of the first band (tightest first) that `days` falls under.
    pub fn score(bands: &[ScoreBand], days: f64) -> u32 {
        bands
            .iter()
            .find(|band| days < band.below_days as f64)
            .map_or(0, |band| band.points)
    }
}

/// Rupee estimates per risk level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostTable {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl CostTable {
    pub fn for_risk(&self, level: RiskLevel) -> u32 {
        match level {
            RiskLevel::Critical => self.critical,
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
        }
    }
}

/// Business thresholds of the maintenance heuristics.
///
/// These are uncalibrated demo values carried over as-is. Scores produced
/// with them order trainsets by urgency; they are not probabilities.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionPolicy {
    // Interval estimation
    pub history_limit: u64,
    pub default_interval_days: i64,
    pub min_closed_for_interval: usize,

    // Risk buckets on days-until-overdue (inclusive upper bounds)
    pub critical_max_days: i64,
    pub high_max_days: i64,
    pub medium_max_days: i64,

    // Confidence
    pub consistent_interval_min_days: i64,
    pub consistent_interval_max_days: i64,
    pub consistent_base_confidence: u32,
    pub inconsistent_base_confidence: u32,
    pub confidence_per_record: u32,
    pub max_history_confidence: u32,
    pub max_confidence: u32,

    // Prediction factors
    pub high_mileage_km: i64,
    pub rich_history_records: usize,
    pub frequent_interval_days: i64,
    pub recent_activity_window_days: i64,
    pub recent_activity_min_cards: usize,

    // Failure patterns
    pub pattern_min_records: usize,
    pub pattern_min_score: u32,
    pub frequency_points_per_failure: u32,
    pub frequency_points_cap: u32,
    pub interval_bands: [ScoreBand; 3],
    pub recency_bands: [ScoreBand; 2],
    pub consistency_min_failures: usize,
    pub consistency_max_gap_days: i64,
    pub consistency_bonus: u32,
    pub max_risk_score: u32,
    pub pattern_high_score: u32,
    pub pattern_critical_score: u32,

    // Smart alerts
    pub prediction_alert_max_days: i64,
    pub overdue_job_days: i64,
    pub overdue_critical_days: i64,
    pub costs: CostTable,
    pub pattern_cost_multiplier: f64,
    pub prediction_downtime_hours: u32,
    pub overdue_downtime_hours: u32,
    pub pattern_downtime_hours: u32,
}

impl PredictionPolicy {
    pub const fn standard() -> Self {
        Self {
            history_limit: 10,
            default_interval_days: 90,
            min_closed_for_interval: 2,

            critical_max_days: 0,
            high_max_days: 7,
            medium_max_days: 30,

            consistent_interval_min_days: 30,
            consistent_interval_max_days: 180,
            consistent_base_confidence: 80,
            inconsistent_base_confidence: 60,
            confidence_per_record: 10,
            max_history_confidence: 50,
            max_confidence: 100,

            high_mileage_km: 15_000,
            rich_history_records: 5,
            frequent_interval_days: 60,
            recent_activity_window_days: 90,
            recent_activity_min_cards: 2,

            pattern_min_records: 2,
            pattern_min_score: 60,
            frequency_points_per_failure: 10,
            frequency_points_cap: 40,
            interval_bands: [ScoreBand::new(30, 30), ScoreBand::new(60, 20), ScoreBand::new(90, 10)],
            recency_bands: [ScoreBand::new(30, 20), ScoreBand::new(60, 10)],
            consistency_min_failures: 3,
            consistency_max_gap_days: 60,
            consistency_bonus: 20,
            max_risk_score: 100,
            pattern_high_score: 80,
            pattern_critical_score: 90,

            prediction_alert_max_days: 7,
            overdue_job_days: 30,
            overdue_critical_days: 60,
            costs: CostTable { critical: 50_000, high: 30_000, medium: 20_000, low: 15_000 },
            pattern_cost_multiplier: 1.5,
            prediction_downtime_hours: 4,
            overdue_downtime_hours: 6,
            pattern_downtime_hours: 8,
        }
    }

    pub fn pattern_cost(&self) -> u32 {
        (f64::from(self.costs.high) * self.pattern_cost_multiplier).round() as u32
    }
}

impl Default for PredictionPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
