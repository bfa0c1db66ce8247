pub mod alerts;
pub mod classify;
pub mod interval;
pub mod overdue;
pub mod patterns;
pub mod policy;
pub mod summary;

#[cfg(test)]
pub mod fixtures;

use std::future::Future;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::FleetError;

pub use alerts::{generate_smart_alerts, AlertType, SmartAlert};
pub use overdue::{predict_maintenance_overdue, MaintenancePrediction, RiskLevel};
pub use patterns::{detect_failure_patterns, FailurePattern};
pub use policy::PredictionPolicy;

const MS_PER_DAY: f64 = 86_400_000.0;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainsetStatus {
    Active,
    Standby,
    Maintenance,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Open,
    InProgress,
    Closed,
}

impl TrainsetStatus {
    pub const ALL: [TrainsetStatus; 3] = [Self::Active, Self::Standby, Self::Maintenance];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Standby => "Standby",
            Self::Maintenance => "Maintenance",
        }
    }
}

impl JobStatus {
    pub const ALL: [JobStatus; 3] = [Self::Open, Self::InProgress, Self::Closed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "InProgress",
            Self::Closed => "Closed",
        }
    }
}

impl FromStr for TrainsetStatus {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| FleetError::Validation(format!("unknown trainset status '{}'", s)))
    }
}

impl FromStr for JobStatus {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| FleetError::Validation(format!("unknown job card status '{}'", s)))
    }
}

/// Trainset row as the prediction pipeline sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainsetRecord {
    pub trainset_id: i32,
    pub serial_no: String,
    pub status: TrainsetStatus,
    pub mileage_km: i64,
    pub last_service_date: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JobCardRecord {
    pub jobcard_id: i32,
    pub trainset_id: i32,
    pub description: String,
    pub status: JobStatus,
    pub raised_date: NaiveDateTime,
    pub closed_date: Option<NaiveDateTime>,
}

impl JobCardRecord {
    /// Closed date when present, otherwise the raised date.
    pub fn effective_date(&self) -> NaiveDateTime {
        self.closed_date.unwrap_or(self.raised_date)
    }
}

/// Job card joined with its trainset's serial number.
#[derive(Clone, Debug, PartialEq)]
pub struct FleetJobCard {
    pub card: JobCardRecord,
    pub serial_no: String,
}

/// Read-only access to fleet data. The pipeline never writes.
pub trait FleetDataSource: Send + Sync {
    fn list_active_trainsets(&self) -> impl Future<Output = Result<Vec<TrainsetRecord>, FleetError>> + Send;

    /// Most recently raised first, at most `limit` cards.
    fn list_job_cards(
        &self,
        trainset_id: i32,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<JobCardRecord>, FleetError>> + Send;

    /// Every card whose trainset exists, most recently raised first.
    fn list_fleet_job_cards(&self) -> impl Future<Output = Result<Vec<FleetJobCard>, FleetError>> + Send;
}

/// Signed distance `later - earlier` in fractional days.
pub fn days_between(later: NaiveDateTime, earlier: NaiveDateTime) -> f64 {
    (later - earlier).num_milliseconds() as f64 / MS_PER_DAY
}
