use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::api::{envelope, AppState};
use crate::analytics::{JobStatus, TrainsetStatus};
use crate::error::FleetError;
use crate::services::normalization::{
    clean_text, parse_date, parse_job_status, parse_mileage, parse_optional_date, parse_trainset_status,
    required_text,
};
use crate::services::registry::{self, NewJobCard, NewTrainset};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainsetRequest {
    pub serial_no: Option<String>,
    pub status: Option<String>,
    pub mileage_km: Option<i64>,
    pub last_service_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobCardRequest {
    pub trainset_id: i32,
    pub description: Option<String>,
    pub status: Option<String>,
    pub raised_date: Option<String>,
    pub closed_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCardQuery {
    pub trainset_id: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseQuery {
    pub closed_date: Option<String>,
}

fn bad_body(rejection: JsonRejection) -> FleetError {
    FleetError::Validation(rejection.body_text())
}

pub async fn register_trainset(
    State(state): State<AppState>,
    payload: Result<Json<CreateTrainsetRequest>, JsonRejection>,
) -> Result<impl IntoResponse, FleetError> {
    let Json(payload) = payload.map_err(bad_body)?;
    let input = NewTrainset {
        serial_no: required_text(payload.serial_no.as_deref(), "serialNo")?,
        status: match clean_text(payload.status.as_deref()) {
            Some(raw) => parse_trainset_status(&raw)?,
            None => TrainsetStatus::Active,
        },
        mileage_km: parse_mileage(payload.mileage_km)?,
        last_service_date: parse_optional_date(payload.last_service_date.as_deref())?,
    };

    let model = registry::register_trainset(&state.db, input, Utc::now().naive_utc()).await?;
    Ok((StatusCode::CREATED, envelope(json!(model), "Trainset registered")))
}

pub async fn list_trainsets(State(state): State<AppState>) -> Result<impl IntoResponse, FleetError> {
    let trainsets = registry::list_trainsets(&state.db).await?;
    let message = format!("{} trainsets", trainsets.len());
    Ok(envelope(json!(trainsets), message))
}

pub async fn log_job_card(
    State(state): State<AppState>,
    payload: Result<Json<CreateJobCardRequest>, JsonRejection>,
) -> Result<impl IntoResponse, FleetError> {
    let Json(payload) = payload.map_err(bad_body)?;
    let now = Utc::now().naive_utc();
    let input = NewJobCard {
        trainset_id: payload.trainset_id,
        description: required_text(payload.description.as_deref(), "description")?,
        status: match clean_text(payload.status.as_deref()) {
            Some(raw) => parse_job_status(&raw)?,
            None => JobStatus::Open,
        },
        raised_date: parse_optional_date(payload.raised_date.as_deref())?.unwrap_or(now),
        closed_date: parse_optional_date(payload.closed_date.as_deref())?,
    };

    let model = registry::log_job_card(&state.db, input, now).await?;
    Ok((StatusCode::CREATED, envelope(json!(model), "Job card logged")))
}

pub async fn list_job_cards(
    State(state): State<AppState>,
    Query(query): Query<JobCardQuery>,
) -> Result<impl IntoResponse, FleetError> {
    let cards = registry::list_job_cards(&state.db, query.trainset_id).await?;
    let message = format!("{} job cards", cards.len());
    Ok(envelope(json!(cards), message))
}

pub async fn close_job_card(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<CloseQuery>,
) -> Result<impl IntoResponse, FleetError> {
    let closed_at = match clean_text(query.closed_date.as_deref()) {
        Some(raw) => parse_date(&raw)?,
        None => Utc::now().naive_utc(),
    };

    let model = registry::close_job_card(&state.db, id, closed_at).await?;
    Ok(envelope(json!(model), "Job card closed"))
}
