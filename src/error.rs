use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Market data fetch error: {0}")] Fetch(String),

    #[error("Timestamp parse error: {0}")] Parse(String),

    #[error("Persistence error: {0}")] Persistence(#[from] sea_orm::DbErr),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    /// Refresh, storage and configuration failures all collapse into one
    /// opaque body; only caller mistakes are echoed back.
    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message) = match self {
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone()),
            | AppError::Fetch(_)
            | AppError::Parse(_)
            | AppError::Persistence(_)
            | AppError::Config(_)
            | AppError::Internal(_) => {
                ("INTERNAL_ERROR", "Internal Server Error".to_string())
            }
        };

        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::InvalidInput(_) => axum::http::StatusCode::BAD_REQUEST,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
