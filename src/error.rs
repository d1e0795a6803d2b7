use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::gpio::DriveMode;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("There is no GPIO controller on this device.")]
    NoController,
    #[error("Pin {0} unavailable: {1}")]
    PinUnavailable(u32, String),
    #[error("Drive mode {0:?} not supported")]
    UnsupportedMode(DriveMode),
    #[error("Pin misuse: {0}")]
    Misuse(String),
    #[error("GPIO error: {0}")]
    Gpio(String),
    #[error("Weather error: {0}")]
    Weather(String),
    #[error("Speech error: {0}")]
    Speech(String),
    #[error("Telemetry error: {0}")]
    Telemetry(String),
    #[error("Presentation error: {0}")]
    Presentation(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoController | AppError::PinUnavailable(..) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::UnsupportedMode(_) | AppError::Misuse(_) => StatusCode::BAD_REQUEST,
            AppError::Weather(_) | AppError::Speech(_) | AppError::Telemetry(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Gpio(_) | AppError::Presentation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
