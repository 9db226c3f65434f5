use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::usecases::payments::PaymentError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            PaymentError::NotFound(msg) | PaymentError::Condition(msg) => msg,
            // Don't leak gateway or database detail to the client
            PaymentError::Gateway(_) => "Payment provider unavailable".to_string(),
            PaymentError::Internal(_) => "Internal server error".to_string(),
        };

        ErrorResponse::new(status, message).into_response()
    }
}
