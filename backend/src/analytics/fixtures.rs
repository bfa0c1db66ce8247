//! In-memory fleet data for pipeline tests.

use chrono::NaiveDateTime;

use super::{
    FleetDataSource, FleetJobCard, JobCardRecord, JobStatus, TrainsetRecord, TrainsetStatus,
};
use crate::error::FleetError;

pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").expect("fixture timestamp")
}

pub fn trainset(id: i32, serial: &str, mileage_km: i64, last_service: Option<&str>) -> TrainsetRecord {
    TrainsetRecord {
        trainset_id: id,
        serial_no: serial.to_string(),
        status: TrainsetStatus::Active,
        mileage_km,
        last_service_date: last_service.map(at),
    }
}

pub fn open_card(id: i32, trainset_id: i32, description: &str, raised: &str) -> JobCardRecord {
    JobCardRecord {
        jobcard_id: id,
        trainset_id,
        description: description.to_string(),
        status: JobStatus::Open,
        raised_date: at(raised),
        closed_date: None,
    }
}

pub fn closed_card(id: i32, trainset_id: i32, description: &str, raised: &str, closed: &str) -> JobCardRecord {
    JobCardRecord {
        status: JobStatus::Closed,
        closed_date: Some(at(closed)),
        ..open_card(id, trainset_id, description, raised)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryFleet {
    pub trainsets: Vec<TrainsetRecord>,
    pub cards: Vec<JobCardRecord>,
    pub failing: bool,
}

impl InMemoryFleet {
    pub fn new(trainsets: Vec<TrainsetRecord>, cards: Vec<JobCardRecord>) -> Self {
        Self { trainsets, cards, failing: false }
    }

    pub fn failing() -> Self {
        Self { failing: true, ..Self::default() }
    }

    fn check(&self) -> Result<(), FleetError> {
        if self.failing {
            return Err(FleetError::Database(sea_orm::DbErr::Custom("disk I/O error".into())));
        }
        Ok(())
    }

    fn newest_first(&self) -> Vec<JobCardRecord> {
        let mut cards = self.cards.clone();
        cards.sort_by(|a, b| b.raised_date.cmp(&a.raised_date).then(b.jobcard_id.cmp(&a.jobcard_id)));
        cards
    }
}

impl FleetDataSource for InMemoryFleet {
    async fn list_active_trainsets(&self) -> Result<Vec<TrainsetRecord>, FleetError> {
        self.check()?;
        Ok(self
            .trainsets
            .iter()
            .filter(|t| t.status == TrainsetStatus::Active)
            .cloned()
            .collect())
    }

    async fn list_job_cards(&self, trainset_id: i32, limit: u64) -> Result<Vec<JobCardRecord>, FleetError> {
        self.check()?;
        Ok(self
            .newest_first()
            .into_iter()
            .filter(|c| c.trainset_id == trainset_id)
            .take(limit as usize)
            .collect())
    }

    async fn list_fleet_job_cards(&self) -> Result<Vec<FleetJobCard>, FleetError> {
        self.check()?;
        Ok(self
            .newest_first()
            .into_iter()
            .filter_map(|card| {
                let serial_no = self
                    .trainsets
                    .iter()
                    .find(|t| t.trainset_id == card.trainset_id)?
                    .serial_no
                    .clone();
                Some(FleetJobCard { card, serial_no })
            })
            .collect())
    }
}
