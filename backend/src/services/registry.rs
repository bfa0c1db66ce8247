//! Writes that populate the fleet: registering trainsets, logging and
//! closing job cards. The prediction pipeline itself never writes.

use chrono::NaiveDateTime;
use sea_orm::*;
use serde::Serialize;

use crate::analytics::{JobStatus, TrainsetStatus};
use crate::entities::{job_card, trainset};
use crate::error::FleetError;

#[derive(Debug, Clone)]
pub struct NewTrainset {
    pub serial_no: String,
    pub status: TrainsetStatus,
    pub mileage_km: i64,
    pub last_service_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewJobCard {
    pub trainset_id: i32,
    pub description: String,
    pub status: JobStatus,
    pub raised_date: NaiveDateTime,
    pub closed_date: Option<NaiveDateTime>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FleetStats {
    pub total_trainsets: u64,
    pub active: u64,
    pub standby: u64,
    pub in_maintenance: u64,
    pub open_job_cards: u64,
    pub in_progress_job_cards: u64,
}

pub async fn register_trainset(
    db: &DatabaseConnection,
    input: NewTrainset,
    now: NaiveDateTime,
) -> Result<trainset::Model, FleetError> {
    let taken = trainset::Entity::find()
        .filter(trainset::Column::SerialNo.eq(input.serial_no.as_str()))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(FleetError::Validation(format!("trainset {} is already registered", input.serial_no)));
    }

    let model = trainset::ActiveModel {
        serial_no: Set(input.serial_no),
        status: Set(input.status.as_str().to_string()),
        mileage_km: Set(input.mileage_km),
        last_service_date: Set(input.last_service_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Registered trainset {} (id {})", model.serial_no, model.trainset_id);
    Ok(model)
}

pub async fn list_trainsets(db: &DatabaseConnection) -> Result<Vec<trainset::Model>, FleetError> {
    Ok(trainset::Entity::find()
        .order_by_asc(trainset::Column::TrainsetId)
        .all(db)
        .await?)
}

pub async fn log_job_card(
    db: &DatabaseConnection,
    input: NewJobCard,
    now: NaiveDateTime,
) -> Result<job_card::Model, FleetError> {
    if trainset::Entity::find_by_id(input.trainset_id).one(db).await?.is_none() {
        return Err(FleetError::NotFound(format!("trainset {}", input.trainset_id)));
    }

    let closed_date = match (input.status, input.closed_date) {
        (JobStatus::Closed, None) => Some(now),
        (JobStatus::Closed, Some(closed)) if closed < input.raised_date => {
            return Err(FleetError::Validation("closed date precedes raised date".to_string()));
        }
        (JobStatus::Closed, closed) => closed,
        (_, Some(_)) => {
            return Err(FleetError::Validation("only closed job cards may carry a closed date".to_string()));
        }
        (_, None) => None,
    };

    let txn = db.begin().await?;
    let model = job_card::ActiveModel {
        trainset_id: Set(input.trainset_id),
        description: Set(input.description),
        status: Set(input.status.as_str().to_string()),
        raised_date: Set(input.raised_date),
        closed_date: Set(closed_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if let Some(closed_at) = closed_date {
        stamp_last_service(&txn, model.trainset_id, closed_at).await?;
    }
    txn.commit().await?;

    tracing::info!("Logged job card {} for trainset {}", model.jobcard_id, model.trainset_id);
    Ok(model)
}

pub async fn list_job_cards(
    db: &DatabaseConnection,
    trainset_id: Option<i32>,
) -> Result<Vec<job_card::Model>, FleetError> {
    let mut query = job_card::Entity::find();
    if let Some(id) = trainset_id {
        query = query.filter(job_card::Column::TrainsetId.eq(id));
    }
    Ok(query
        .order_by_desc(job_card::Column::RaisedDate)
        .order_by_desc(job_card::Column::JobcardId)
        .all(db)
        .await?)
}

/// Closes a job card and stamps its trainset's last service date, unless the
/// trainset already records a later service. Closing twice is a no-op.
pub async fn close_job_card(
    db: &DatabaseConnection,
    jobcard_id: i32,
    closed_at: NaiveDateTime,
) -> Result<job_card::Model, FleetError> {
    let txn = db.begin().await?;

    let card = job_card::Entity::find_by_id(jobcard_id)
        .one(&txn)
        .await?
        .ok_or_else(|| FleetError::NotFound(format!("job card {}", jobcard_id)))?;

    if card.status == JobStatus::Closed.as_str() {
        txn.commit().await?;
        return Ok(card);
    }
    if closed_at < card.raised_date {
        return Err(FleetError::Validation("closed date precedes raised date".to_string()));
    }

    let trainset_id = card.trainset_id;
    let mut active: job_card::ActiveModel = card.into();
    active.status = Set(JobStatus::Closed.as_str().to_string());
    active.closed_date = Set(Some(closed_at));
    active.updated_at = Set(closed_at);
    let closed = active.update(&txn).await?;

    stamp_last_service(&txn, trainset_id, closed_at).await?;

    txn.commit().await?;
    tracing::info!("Closed job card {} for trainset {}", closed.jobcard_id, trainset_id);
    Ok(closed)
}

/// Moves the trainset's last service date forward to `closed_at`; an
/// earlier close never rewinds it.
async fn stamp_last_service(
    txn: &DatabaseTransaction,
    trainset_id: i32,
    closed_at: NaiveDateTime,
) -> Result<(), FleetError> {
    if let Some(train) = trainset::Entity::find_by_id(trainset_id).one(txn).await? {
        if train.last_service_date.map_or(true, |last| last < closed_at) {
            let mut train: trainset::ActiveModel = train.into();
            train.last_service_date = Set(Some(closed_at));
            train.updated_at = Set(closed_at);
            train.update(txn).await?;
        }
    }
    Ok(())
}

pub async fn fleet_stats(db: &DatabaseConnection) -> Result<FleetStats, FleetError> {
    let trainsets_with = |status: TrainsetStatus| {
        trainset::Entity::find()
            .filter(trainset::Column::Status.eq(status.as_str()))
            .count(db)
    };
    let cards_with = |status: JobStatus| {
        job_card::Entity::find()
            .filter(job_card::Column::Status.eq(status.as_str()))
            .count(db)
    };

    Ok(FleetStats {
        total_trainsets: trainset::Entity::find().count(db).await?,
        active: trainsets_with(TrainsetStatus::Active).await?,
        standby: trainsets_with(TrainsetStatus::Standby).await?,
        in_maintenance: trainsets_with(TrainsetStatus::Maintenance).await?,
        open_job_cards: cards_with(JobStatus::Open).await?,
        in_progress_job_cards: cards_with(JobStatus::InProgress).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::at;
    use crate::analytics::{predict_maintenance_overdue, PredictionPolicy};
    use crate::db::connect_in_memory;
    use crate::services::fleet_source::SeaOrmFleetSource;

    fn new_trainset(serial: &str, status: TrainsetStatus) -> NewTrainset {
        NewTrainset {
            serial_no: serial.to_string(),
            status,
            mileage_km: 12_500,
            last_service_date: None,
        }
    }

    fn new_card(trainset_id: i32, status: JobStatus) -> NewJobCard {
        NewJobCard {
            trainset_id,
            description: "Brake inspection".to_string(),
            status,
            raised_date: at("2024-04-01 00:00"),
            closed_date: None,
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_serials() {
        let db = connect_in_memory().await;
        let now = at("2024-05-01 00:00");
        register_trainset(&db, new_trainset("TS-01", TrainsetStatus::Active), now).await.unwrap();

        let err = register_trainset(&db, new_trainset("TS-01", TrainsetStatus::Standby), now)
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::Validation(_)));
    }

    #[tokio::test]
    async fn job_card_needs_known_trainset() {
        let db = connect_in_memory().await;
        let err = log_job_card(&db, new_card(42, JobStatus::Open), at("2024-05-01 00:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::NotFound(_)));
    }

    #[tokio::test]
    async fn closed_card_without_date_is_closed_now() {
        let db = connect_in_memory().await;
        let now = at("2024-05-01 00:00");
        let train = register_trainset(&db, new_trainset("TS-01", TrainsetStatus::Active), now).await.unwrap();

        let card = log_job_card(&db, new_card(train.trainset_id, JobStatus::Closed), now).await.unwrap();
        assert_eq!(card.closed_date, Some(now));

        let mut open_with_date = new_card(train.trainset_id, JobStatus::Open);
        open_with_date.closed_date = Some(now);
        assert!(log_job_card(&db, open_with_date, now).await.is_err());
    }

    #[tokio::test]
    async fn closing_stamps_last_service_date() {
        let db = connect_in_memory().await;
        let now = at("2024-05-01 00:00");
        let train = register_trainset(&db, new_trainset("TS-01", TrainsetStatus::Active), now).await.unwrap();
        let card = log_job_card(&db, new_card(train.trainset_id, JobStatus::Open), now).await.unwrap();

        let closed_at = at("2024-05-02 09:30");
        let closed = close_job_card(&db, card.jobcard_id, closed_at).await.unwrap();
        assert_eq!(closed.status, "Closed");
        assert_eq!(closed.closed_date, Some(closed_at));

        let train = trainset::Entity::find_by_id(train.trainset_id).one(&db).await.unwrap().unwrap();
        assert_eq!(train.last_service_date, Some(closed_at));

        // second close keeps the original timestamp
        let again = close_job_card(&db, card.jobcard_id, at("2024-06-01 00:00")).await.unwrap();
        assert_eq!(again.closed_date, Some(closed_at));

        assert!(matches!(close_job_card(&db, 999, closed_at).await, Err(FleetError::NotFound(_))));
    }

    #[tokio::test]
    async fn logging_a_closed_card_stamps_last_service_date() {
        let db = connect_in_memory().await;
        let now = at("2024-05-01 00:00");
        let train = register_trainset(&db, new_trainset("TS-01", TrainsetStatus::Active), now).await.unwrap();

        let mut serviced = new_card(train.trainset_id, JobStatus::Closed);
        serviced.closed_date = Some(at("2024-04-10 00:00"));
        log_job_card(&db, serviced, now).await.unwrap();

        // an older closed card must not rewind the stamp
        let mut older = new_card(train.trainset_id, JobStatus::Closed);
        older.raised_date = at("2024-03-01 00:00");
        older.closed_date = Some(at("2024-03-02 00:00"));
        log_job_card(&db, older, now).await.unwrap();

        for _ in 0..11 {
            log_job_card(&db, new_card(train.trainset_id, JobStatus::Open), now).await.unwrap();
        }

        let stored = trainset::Entity::find_by_id(train.trainset_id).one(&db).await.unwrap().unwrap();
        assert_eq!(stored.last_service_date, Some(at("2024-04-10 00:00")));

        // the ten newest cards are all open, so the prediction relies on the stamp
        let policy = PredictionPolicy::default();
        let source = SeaOrmFleetSource::new(db.clone());
        let predictions = predict_maintenance_overdue(&source, &policy, now).await;
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].predicted_overdue_date, at("2024-07-09 00:00"));
    }

    #[tokio::test]
    async fn stats_count_by_status() {
        let db = connect_in_memory().await;
        let now = at("2024-05-01 00:00");
        let a = register_trainset(&db, new_trainset("TS-01", TrainsetStatus::Active), now).await.unwrap();
        register_trainset(&db, new_trainset("TS-02", TrainsetStatus::Standby), now).await.unwrap();
        register_trainset(&db, new_trainset("TS-03", TrainsetStatus::Maintenance), now).await.unwrap();
        log_job_card(&db, new_card(a.trainset_id, JobStatus::Open), now).await.unwrap();
        log_job_card(&db, new_card(a.trainset_id, JobStatus::InProgress), now).await.unwrap();
        log_job_card(&db, new_card(a.trainset_id, JobStatus::Closed), now).await.unwrap();

        let stats = fleet_stats(&db).await.unwrap();
        assert_eq!(
            stats,
            FleetStats {
                total_trainsets: 3,
                active: 1,
                standby: 1,
                in_maintenance: 1,
                open_job_cards: 1,
                in_progress_job_cards: 1,
            }
        );
    }
}
