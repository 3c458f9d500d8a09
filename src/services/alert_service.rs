use crate::db::entity::alert;
use crate::error::{ AppError, Result };
use chrono::Utc;
use sea_orm::{ ActiveModelTrait, ActiveValue, DatabaseConnection };

pub const DEFAULT_ALERT_METHOD: &str = "Threshold";

#[derive(Clone)]
pub struct AlertService {
    db: DatabaseConnection,
}

#[derive(Debug, Clone)]
pub struct CreateAlertRequest {
    pub user_id: i32,
    pub crypto_id: i32,
    pub threshold_price: Option<f64>,
    pub threshold_percentage: Option<f64>,
    pub method: String,
    pub notification_method: String,
}

impl AlertService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Persist a new alert. Alerts are stored only, never evaluated.
    pub async fn create_alert(&self, req: CreateAlertRequest) -> Result<alert::Model> {
        if req.notification_method.trim().is_empty() {
            return Err(AppError::InvalidInput("notification_method must not be empty".to_string()));
        }

        let now = Utc::now();

        let alert = alert::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(req.user_id),
            crypto_id: ActiveValue::Set(req.crypto_id),
            threshold_price: ActiveValue::Set(req.threshold_price),
            threshold_percentage: ActiveValue::Set(req.threshold_percentage),
            method: ActiveValue::Set(req.method),
            notification_method: ActiveValue::Set(req.notification_method),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let alert = alert.insert(&self.db).await?;
        tracing::info!(alert_id = alert.id, user_id = alert.user_id, "alert created");

        Ok(alert)
    }
}
