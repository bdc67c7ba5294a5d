use crate::billing::{BillingError, DocumentError};
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Billing(BillingError),
    InvalidInput(String),
    SessionUnavailable,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Billing(err) => write!(f, "{}", err),
            AppError::InvalidInput(detail) => write!(f, "invalid input: {}", detail),
            AppError::SessionUnavailable => write!(f, "billing session unavailable"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Billing(err) => Some(err),
            AppError::InvalidInput(_) | AppError::SessionUnavailable => None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Billing(BillingError::Locked) => StatusCode::FORBIDDEN,
            AppError::Billing(BillingError::ConfirmationRequired) => StatusCode::BAD_REQUEST,
            AppError::Billing(BillingError::NightRateUnavailable) => StatusCode::CONFLICT,
            AppError::Billing(BillingError::UnknownItem(_))
            | AppError::Billing(BillingError::UnknownEmployee(_)) => StatusCode::NOT_FOUND,
            AppError::Billing(BillingError::InvalidAmount(_))
            | AppError::Billing(BillingError::Document(DocumentError::EmptyBill))
            | AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Billing(BillingError::Document(DocumentError::Render(_)))
            | AppError::Billing(BillingError::Codec(_))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::SessionUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<BillingError> for AppError {
    fn from(value: BillingError) -> Self {
        Self::Billing(value)
    }
}
