pub mod general;
pub mod variation;
pub mod vision;

use crate::{
    error::{Result, WizardyError},
    models::{GatewayEvent, GatewayResponse, ResponseBody},
};
use async_trait::async_trait;

pub use general::GeneralHandler;
pub use variation::VariationHandler;
pub use vision::VisionHandler;

pub const GENERIC_ERROR_MESSAGE: &str = "Internal Server Error";

/// How much of a failure the caller gets to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorExposure {
    /// The error message is returned without its category prefix.
    Echo,
    /// Only [`GENERIC_ERROR_MESSAGE`] is returned.
    Conceal,
}

impl ErrorExposure {
    pub fn message(&self, err: &WizardyError) -> String {
        match self {
            ErrorExposure::Echo => err.detail(),
            ErrorExposure::Conceal => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// One gateway-facing function. Implementors supply `process`; the provided
/// methods take care of the envelope, the preflight short-circuit and
/// turning errors into 500 responses.
#[async_trait]
pub trait GatewayHandler: Send + Sync {
    fn name(&self) -> &'static str;

    fn exposure(&self) -> ErrorExposure;

    async fn process(&self, event: &GatewayEvent) -> Result<ResponseBody>;

    async fn handle(&self, event: serde_json::Value) -> GatewayResponse {
        log::info!("Received event: {}", event);

        match GatewayEvent::from_value(event) {
            Ok(event) => self.handle_event(event).await,
            Err(err) => self.failure(err),
        }
    }

    async fn handle_event(&self, event: GatewayEvent) -> GatewayResponse {
        if event.is_preflight() {
            return GatewayResponse::preflight();
        }

        match self.process(&event).await {
            Ok(body) => GatewayResponse::ok(&body),
            Err(err) => self.failure(err),
        }
    }

    fn failure(&self, err: WizardyError) -> GatewayResponse {
        log::error!("Error processing {} request: {}", self.name(), err);
        GatewayResponse::internal_error(self.exposure().message(&err))
    }
}

pub(crate) fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| WizardyError::missing_field(field))
}
