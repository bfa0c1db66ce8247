use sea_orm::*;

use crate::analytics::{FleetDataSource, FleetJobCard, JobCardRecord, TrainsetRecord, TrainsetStatus};
use crate::entities::{job_card, trainset};
use crate::error::FleetError;

/// `FleetDataSource` backed by the application database.
#[derive(Clone)]
pub struct SeaOrmFleetSource {
    db: DatabaseConnection,
}

impl SeaOrmFleetSource {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl TryFrom<trainset::Model> for TrainsetRecord {
    type Error = FleetError;

    fn try_from(m: trainset::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            trainset_id: m.trainset_id,
            status: m.status.parse()?,
            serial_no: m.serial_no,
            mileage_km: m.mileage_km,
            last_service_date: m.last_service_date,
        })
    }
}

impl TryFrom<job_card::Model> for JobCardRecord {
    type Error = FleetError;

    fn try_from(m: job_card::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            jobcard_id: m.jobcard_id,
            trainset_id: m.trainset_id,
            status: m.status.parse()?,
            description: m.description,
            raised_date: m.raised_date,
            closed_date: m.closed_date,
        })
    }
}

impl FleetDataSource for SeaOrmFleetSource {
    async fn list_active_trainsets(&self) -> Result<Vec<TrainsetRecord>, FleetError> {
        trainset::Entity::find()
            .filter(trainset::Column::Status.eq(TrainsetStatus::Active.as_str()))
            .order_by_asc(trainset::Column::TrainsetId)
            .all(&self.db)
            .await?
            .into_iter()
            .map(TrainsetRecord::try_from)
            .collect()
    }

    async fn list_job_cards(&self, trainset_id: i32, limit: u64) -> Result<Vec<JobCardRecord>, FleetError> {
        job_card::Entity::find()
            .filter(job_card::Column::TrainsetId.eq(trainset_id))
            .order_by_desc(job_card::Column::RaisedDate)
            .order_by_desc(job_card::Column::JobcardId)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(JobCardRecord::try_from)
            .collect()
    }

    async fn list_fleet_job_cards(&self) -> Result<Vec<FleetJobCard>, FleetError> {
        let rows = job_card::Entity::find()
            .find_also_related(trainset::Entity)
            .order_by_desc(job_card::Column::RaisedDate)
            .order_by_desc(job_card::Column::JobcardId)
            .all(&self.db)
            .await?;

        let mut cards = Vec::with_capacity(rows.len());
        for (card, train) in rows {
            // inner join: cards of unknown trainsets are skipped
            let Some(train) = train else { continue };
            cards.push(FleetJobCard {
                card: card.try_into()?,
                serial_no: train.serial_no,
            });
        }
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::at;
    use crate::analytics::JobStatus;
    use crate::db::connect_in_memory;

    async fn seed(db: &DatabaseConnection) {
        let now = at("2024-05-01 00:00");
        for (serial, status) in [("TS-01", "Active"), ("TS-02", "Standby"), ("TS-03", "Active")] {
            trainset::ActiveModel {
                serial_no: Set(serial.to_string()),
                status: Set(status.to_string()),
                mileage_km: Set(1_000),
                last_service_date: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await
            .unwrap();
        }

        let cards = [
            (1, "Brake pads", "Closed", "2024-04-01 00:00", Some("2024-04-02 00:00")),
            (1, "Door sensor", "Open", "2024-04-20 00:00", None),
            (1, "HVAC filter", "InProgress", "2024-03-10 00:00", None),
            (3, "Signal relay", "Open", "2024-04-25 00:00", None),
        ];
        for (trainset_id, description, status, raised, closed) in cards {
            job_card::ActiveModel {
                trainset_id: Set(trainset_id),
                description: Set(description.to_string()),
                status: Set(status.to_string()),
                raised_date: Set(at(raised)),
                closed_date: Set(closed.map(at)),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn lists_only_active_trainsets() {
        let db = connect_in_memory().await;
        seed(&db).await;
        let source = SeaOrmFleetSource::new(db);

        let serials: Vec<String> = source
            .list_active_trainsets()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.serial_no)
            .collect();
        assert_eq!(serials, vec!["TS-01", "TS-03"]);
    }

    #[tokio::test]
    async fn job_cards_newest_first_and_limited() {
        let db = connect_in_memory().await;
        seed(&db).await;
        let source = SeaOrmFleetSource::new(db);

        let cards = source.list_job_cards(1, 2).await.unwrap();
        let descriptions: Vec<&str> = cards.iter().map(|c| c.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Door sensor", "Brake pads"]);
        assert_eq!(cards[1].status, JobStatus::Closed);
        assert_eq!(cards[1].closed_date, Some(at("2024-04-02 00:00")));
    }

    #[tokio::test]
    async fn fleet_cards_carry_serial_numbers() {
        let db = connect_in_memory().await;
        seed(&db).await;
        let source = SeaOrmFleetSource::new(db);

        let cards = source.list_fleet_job_cards().await.unwrap();
        let rows: Vec<(&str, &str)> = cards
            .iter()
            .map(|c| (c.serial_no.as_str(), c.card.description.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("TS-03", "Signal relay"),
                ("TS-01", "Door sensor"),
                ("TS-01", "Brake pads"),
                ("TS-01", "HVAC filter"),
            ]
        );
    }

    #[tokio::test]
    async fn unknown_status_is_reported() {
        let db = connect_in_memory().await;
        let now = at("2024-05-01 00:00");
        trainset::ActiveModel {
            serial_no: Set("TS-09".to_string()),
            status: Set("Active".to_string()),
            mileage_km: Set(0),
            last_service_date: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        job_card::ActiveModel {
            trainset_id: Set(1),
            description: Set("Brake".to_string()),
            status: Set("Pending".to_string()),
            raised_date: Set(now),
            closed_date: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let source = SeaOrmFleetSource::new(db);
        assert!(matches!(source.list_job_cards(1, 10).await, Err(FleetError::Validation(_))));
    }
}
