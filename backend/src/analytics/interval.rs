use chrono::NaiveDateTime;

use super::{days_between, JobCardRecord, PredictionPolicy};

/// Average days between consecutive maintenance events of one trainset.
///
/// `closed` holds the trainset's closed cards, most recent first. Each card
/// is dated by its closed date, falling back to the raised date. With fewer
/// than `min_closed_for_interval` cards the policy default is returned.
pub fn estimate_interval(closed: &[JobCardRecord], policy: &PredictionPolicy) -> i64 {
    if closed.len() < policy.min_closed_for_interval {
        return policy.default_interval_days;
    }

    let dates: Vec<NaiveDateTime> = closed.iter().map(JobCardRecord::effective_date).collect();
    let gaps = dates.windows(2).map(|pair| days_between(pair[0], pair[1]).abs());
    round_days(mean(gaps))
}

/// Rounded mean gap between dates already sorted newest first.
pub fn average_gap(dates_newest_first: &[NaiveDateTime]) -> i64 {
    if dates_newest_first.len() < 2 {
        return 0;
    }
    let gaps = dates_newest_first.windows(2).map(|pair| days_between(pair[0], pair[1]));
    round_days(mean(gaps))
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

// Halves round up, also for negative values.
fn round_days(days: f64) -> i64 {
    (days + 0.5).floor() as i64
}
