//! Linux evdev-backed dial

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use evdev::{Device, EventStream};
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{EventSource, RawEvent};

/// Open input device delivering events asynchronously
pub struct DialDevice {
    stream: EventStream,
}

impl DialDevice {
    /// Open the device at `path`, failing immediately if it is not there.
    pub fn open(path: &Path) -> Result<Self> {
        let device =
            Device::open(path).with_context(|| format!("{} not available", path.display()))?;
        info!(
            "Opened input device {} ({})",
            path.display(),
            device.name().unwrap_or("unnamed")
        );
        let stream = device
            .into_event_stream()
            .with_context(|| format!("failed to read events from {}", path.display()))?;
        Ok(Self { stream })
    }

    /// Open the device at `path`, retrying every `retry_delay` until it shows
    /// up (dial paired late, Bluetooth reconnecting). Gives up only on shutdown.
    pub async fn open_with_retry(
        path: &Path,
        retry_delay: Duration,
        shutdown: &CancellationToken,
    ) -> Result<Self> {
        loop {
            match Self::open(path) {
                Ok(device) => return Ok(device),
                Err(e) => warn!("{:#}, retrying in {:?}", e, retry_delay),
            }

            tokio::select! {
                _ = shutdown.cancelled() => {
                    return Err(anyhow!("shutdown while waiting for {}", path.display()));
                }
                _ = tokio::time::sleep(retry_delay) => {}
            }
        }
    }
}

#[async_trait]
impl EventSource for DialDevice {
    async fn next_event(&mut self) -> std::io::Result<RawEvent> {
        let event = self.stream.next_event().await?;
        Ok(RawEvent::new(event.event_type().0, event.code(), event.value()))
    }
}
