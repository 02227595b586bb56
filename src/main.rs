//! Dial Volume Bridge
//!
//! Press and turn the dial to change the volume of a BluOS player.

use dial_volume_bridge::config;

use anyhow::Result;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dial_volume_bridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting Dial Volume Bridge v{} ({})",
        env!("DIAL_VERSION"),
        env!("DIAL_GIT_SHA")
    );

    let config = config::load_config()?;
    tracing::info!(
        "Configuration loaded, player {}:{}, input {}",
        config.device.host,
        config.device.port,
        config.input.path.display()
    );

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    run(config, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(target_os = "linux")]
async fn run(config: config::Config, shutdown: CancellationToken) -> Result<()> {
    use anyhow::Context;
    use dial_volume_bridge::{
        adapters::bluos::RemoteVolumeDevice, controller::VolumeController, input::DialDevice,
    };

    let mut dial = match config.input.retry_delay() {
        Some(delay) => DialDevice::open_with_retry(&config.input.path, delay, &shutdown).await?,
        None => DialDevice::open(&config.input.path)?,
    };

    let base_url = config.device.base_url()?;
    let device = RemoteVolumeDevice::initialize(base_url.clone(), &config.volume)
        .await
        .with_context(|| format!("BluOS player at {} not reachable", base_url))?;

    let mut controller = VolumeController::new(device);
    controller
        .run(&mut dial, config.input.rotation, &shutdown)
        .await
}

#[cfg(not(target_os = "linux"))]
async fn run(_config: config::Config, _shutdown: CancellationToken) -> Result<()> {
    anyhow::bail!("dial input requires Linux evdev")
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
