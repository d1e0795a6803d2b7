use std::future::Future;

use crate::error::AppError;

pub trait TelemetrySender {
    fn send(&self, message: &[u8]) -> impl Future<Output = Result<(), AppError>>;
}

/// Accepts and discards every message. Cloud reporting is off in this build.
pub struct DisabledTelemetry;

impl TelemetrySender for DisabledTelemetry {
    async fn send(&self, _message: &[u8]) -> Result<(), AppError> {
        Ok(())
    }
}
