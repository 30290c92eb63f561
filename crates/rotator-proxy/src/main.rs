use std::sync::Arc;

use rotator_core::config::{Config, Credentials, CLIENT_ID_ENV, CLIENT_SECRET_ENV};
use rotator_proxy::token::MemoryCredentialCache;
use rotator_proxy::{start_server, AppState};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = rotator_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("proxy.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,rotator_proxy=debug")),
        )
        .init();

    info!("Log file: {:?}", log_path);

    let config = Config::load()?;
    info!("Config loaded from: {:?}", Config::config_path());

    let credentials = Credentials::from_env();
    if credentials.is_none() {
        warn!(
            "{} / {} not set; every status request will fail until they are",
            CLIENT_ID_ENV, CLIENT_SECRET_ENV
        );
    }

    let state = AppState::new(
        &config.proxy,
        credentials,
        Arc::new(MemoryCredentialCache::new()),
    )?;

    let server = start_server(&config.proxy.bind_address, config.proxy.port, state).await?;
    server.await??;

    Ok(())
}
