use decor_hunter::{config::Config, logger, server};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    logger::init_with_config(
        logger::LoggerConfig::development().with_level(logger::LogLevel::Debug),
    )?;

    log::info!("🔍 Checking provider environment...");

    match env::var("OPENAI_API_KEY") {
        Ok(key) => {
            log::info!("✅ Provider credential found in environment");
            log::debug!("Key starts with: {}...", &key[..5.min(key.len())]);
        }
        Err(_) => {
            // Not fatal at startup; generation calls will fail at the provider.
            log::warn!("⚠️  No OPENAI_API_KEY set, generation requests will be rejected by the provider");
        }
    }

    let config = Config::from_env();

    logger::log_startup_info(
        "decor-hunter",
        env!("CARGO_PKG_VERSION"),
        config.port.unwrap_or(server::DEFAULT_PORT),
    );
    logger::log_config_info(&config);

    server::start_server(config).await?;

    Ok(())
}
