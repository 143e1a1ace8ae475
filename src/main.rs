use wizardy::logger::{self, LoggerConfig};
use wizardy::Bootstrap;

const DEFAULT_PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file first
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    logger::init_with_config(LoggerConfig::development())?;

    log::info!("🔍 Checking AWS environment...");
    match std::env::var("AWS_REGION").or_else(|_| std::env::var("AWS_DEFAULT_REGION")) {
        Ok(region) => log::info!("AWS region: {}", region),
        Err(_) => log::warn!("No AWS region environment variable set, relying on the default chain"),
    }

    let bootstrap = Bootstrap::from_env().await;
    logger::log_config_info(bootstrap.config());

    let port = bootstrap.config().port.unwrap_or(DEFAULT_PORT);
    wizardy::server::run(bootstrap, port).await?;

    Ok(())
}
