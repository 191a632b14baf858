//! OTP console
//!
//! Composition root: loads configuration, initialises logging, builds the OTP
//! service and reads `send` / `verify` / `status` commands from stdin until
//! `quit`, end of input or Ctrl-C, then shuts the service down.

mod app;
mod console;
mod telemetry;

use anyhow::Context;
use tokio::io::BufReader;
use tracing::info;

use otp_shared::{AppConfig, Environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_files();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    telemetry::init(&config.logging)?;

    info!(
        environment = %config.environment,
        sms_provider = ?config.sms.provider,
        redis_enabled = config.cache.enabled,
        "Starting OTP console"
    );

    let service = app::build_service(&config)?;

    let result = console::run(
        &service,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await;

    service.close().await;
    info!("OTP console stopped");

    result
}

/// Load `.env.<environment>` first, then `.env`; existing variables win
fn load_env_files() {
    let environment = Environment::from_env();
    dotenvy::from_filename(environment.env_file()).ok();
    dotenvy::dotenv().ok();
}
