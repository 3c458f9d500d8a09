use axum::{ extract::State, Json };
use serde::{ Deserialize, Serialize };

use crate::error::Result;
use crate::services::alert_service::{ CreateAlertRequest, DEFAULT_ALERT_METHOD };

use super::AppState;

#[derive(Deserialize)]
pub struct AlertCreate {
    pub user_id: i32,
    pub crypto_id: i32,
    #[serde(default)]
    pub threshold_price: Option<f64>,
    #[serde(default)]
    pub threshold_percentage: Option<f64>,
    #[serde(default = "default_method")]
    pub method: String,
    pub notification_method: String,
}

fn default_method() -> String {
    DEFAULT_ALERT_METHOD.to_string()
}

#[derive(Serialize)]
pub struct AlertCreatedResponse {
    pub status: &'static str,
    pub alert_id: i32,
    pub message: &'static str,
}

pub async fn create_alert(
    State(state): State<AppState>,
    Json(request): Json<AlertCreate>
) -> Result<Json<AlertCreatedResponse>> {
    let alert = state.alert_service.create_alert(CreateAlertRequest {
        user_id: request.user_id,
        crypto_id: request.crypto_id,
        threshold_price: request.threshold_price,
        threshold_percentage: request.threshold_percentage,
        method: request.method,
        notification_method: request.notification_method,
    }).await?;

    Ok(
        Json(AlertCreatedResponse {
            status: "success",
            alert_id: alert.id,
            message: "Alert created successfully.",
        })
    )
}
