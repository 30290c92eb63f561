mod action;
mod app;
mod poller;
mod theme;
mod ui;
mod viewport;
mod widgets;

use std::time::Duration;

use rotator_core::config::Config;
use rotator_core::engine::Rotator;
use rotator_core::roster::RosterStore;
use rotator_core::store::JsonFileStore;

use crate::poller::StatusPoller;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = rotator_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("rotator.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // The terminal belongs to the UI from here on.
    eprintln!("rotator log: {}", log_path.display());

    tracing::info!("rotator starting…");

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("config unreadable ({}), using defaults", e);
        Config::default()
    });
    tracing::info!("Config loaded from: {:?}", Config::config_path());

    let store = JsonFileStore::open(&config.paths.store_file);
    tracing::info!("Roster store: {:?}", store.path());
    let roster = RosterStore::load(store);

    let rotator = Rotator::new(
        roster,
        config.client.interval_secs,
        config.client.live_only,
        config.client.muted,
    );
    let poller = StatusPoller::new(
        config.client.proxy_url.clone(),
        Duration::from_secs(config.client.request_timeout_secs),
    )?;

    let app = app::App::new(
        rotator,
        poller,
        Duration::from_secs(config.client.poll_interval_secs.max(1)),
        config.client.parent_host.clone(),
    );
    app.run().await?;

    Ok(())
}
