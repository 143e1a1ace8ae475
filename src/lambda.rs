//! Lambda runtime glue shared by the three function binaries.

use crate::{
    bootstrap::{Bootstrap, Platform},
    handlers::GatewayHandler,
    logger::{self, LoggerConfig},
    models::GatewayResponse,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;

/// Serves `handler` until the runtime shuts the process down.
pub async fn serve<H>(handler: H) -> Result<(), Error>
where
    H: GatewayHandler + 'static,
{
    let handler = Arc::new(handler);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = Arc::clone(&handler);
        async move {
            log::debug!("Invocation {}", event.context.request_id);
            Ok::<GatewayResponse, Error>(handler.handle(event.payload).await)
        }
    }))
    .await
}

/// Sets up logging, bootstraps the platform during cold start and serves the
/// handler built from it.
pub async fn start<H, F>(name: &str, build: F) -> Result<(), Error>
where
    H: GatewayHandler + 'static,
    F: FnOnce(&Platform) -> H,
{
    logger::init_with_config(LoggerConfig::from_env().with_function(name))?;

    let bootstrap = Bootstrap::from_env().await;
    logger::log_config_info(bootstrap.config());

    let platform = bootstrap.platform().await.map_err(|e| {
        log::error!("❌ Cold start failed: {}", e);
        e
    })?;
    log::info!("🚀 {} function ready", name);

    serve(build(&platform)).await
}
