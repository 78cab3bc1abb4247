use anyhow::Context;
use tracing::{info, warn};

use climatewise::api::{APP_NAME, AppState};
use climatewise::config::AppConfig;
use climatewise::{telemetry, web};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let telemetry = telemetry::init(&config.logging)?;

    info!(
        version = climatewise::VERSION,
        environment = %config.server.environment,
        "{} starting on port {}",
        APP_NAME,
        config.server.port
    );
    info!("Frontend origins: {}", config.server.cors_origins.join(", "));
    if config.groq.api_key.is_none() {
        warn!("GROQ_API_KEY is not set, AI endpoints will fail");
    }

    let state = AppState::from_config(&config).context("Failed to build upstream clients")?;
    let result = web::run(&config.server, state).await;

    telemetry.shutdown();
    result
}
