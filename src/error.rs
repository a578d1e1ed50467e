use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::subs::SubscriptionError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Subscription(err) => match err {
                SubscriptionError::Validation(_) | SubscriptionError::InvalidRange(_) => {
                    StatusCode::BAD_REQUEST
                }
                SubscriptionError::NotFound(_) => StatusCode::NOT_FOUND,
                SubscriptionError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message returned to the client. Storage details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Subscription(SubscriptionError::NotFound(_)) => {
                "subscription not found".to_string()
            }
            AppError::Subscription(SubscriptionError::Storage(_)) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(?self);
        } else {
            tracing::warn!(error = %self, %status, "request rejected");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
