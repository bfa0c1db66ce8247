use axum::{extract::State, response::IntoResponse, Json};

use crate::api::AppState;
use crate::error::FleetError;
use crate::services::registry;

pub async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse, FleetError> {
    Ok(Json(registry::fleet_stats(&state.db).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::api::test_support::{app, send};

    #[tokio::test]
    async fn reports_fleet_counts() {
        let (app, _) = app().await;
        send(&app, Method::POST, "/api/v1/trainsets", Some(json!({ "serialNo": "TS-01" }))).await;
        send(&app, Method::POST, "/api/v1/trainsets", Some(json!({ "serialNo": "TS-02", "status": "Maintenance" }))).await;
        send(&app, Method::POST, "/api/v1/job-cards", Some(json!({ "trainsetId": 2, "description": "HVAC" }))).await;

        let (status, body) = send(&app, Method::GET, "/api/v1/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalTrainsets"], 2);
        assert_eq!(body["active"], 1);
        assert_eq!(body["inMaintenance"], 1);
        assert_eq!(body["openJobCards"], 1);
    }
}
