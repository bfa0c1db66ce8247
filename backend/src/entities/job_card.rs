use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job_cards")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub jobcard_id: i32,
    #[sea_orm(indexed)]
    pub trainset_id: i32,
    #[sea_orm(column_type = "Text")]
    pub description: String,              // Free text, keyword-classified for patterns
    pub status: String,                   // Open, InProgress, Closed
    pub raised_date: DateTime,
    pub closed_date: Option<DateTime>,    // Set when the card is closed
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trainset::Entity",
        from = "Column::TrainsetId",
        to = "super::trainset::Column::TrainsetId"
    )]
    Trainset,
}

impl Related<super::trainset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trainset.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
