pub mod bootstrap;
pub mod config;
pub mod download;
pub mod error;
pub mod handlers;
pub mod lambda;
pub mod logger;
pub mod models;
pub mod storage;
pub mod vertex;

#[cfg(feature = "server")]
pub mod server;

#[cfg(test)]
mod testing;

pub use bootstrap::{Bootstrap, Platform};
pub use config::Config;
pub use error::{Result, WizardyError};
pub use handlers::{GatewayHandler, GeneralHandler, VariationHandler, VisionHandler};
pub use vertex::VertexClient;
