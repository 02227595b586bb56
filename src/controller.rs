//! Press-and-rotate gesture handling
//!
//! The dial only changes volume while its button is held down, so an
//! accidental brush against the knob does nothing.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::adapters::VolumeDevice;
use crate::input::{EventSource, InputEvent, RotationMatch};

pub struct VolumeController<D: VolumeDevice> {
    device: D,
    button_held: bool,
}

impl<D: VolumeDevice> VolumeController<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            button_held: false,
        }
    }

    pub fn button_held(&self) -> bool {
        self.button_held
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Apply one decoded event. Device failures are logged and dropped;
    /// policy rejections are logged by the device itself.
    pub async fn handle(&mut self, event: InputEvent) {
        let result = match event {
            InputEvent::ButtonPress => {
                debug!("Button pressed");
                self.button_held = true;
                return;
            }
            InputEvent::ButtonRelease => {
                debug!("Button released");
                self.button_held = false;
                return;
            }
            InputEvent::RotateClockwise => {
                debug!("Rotated CW");
                if !self.button_held {
                    return;
                }
                self.device.increase_volume().await
            }
            InputEvent::RotateCounterClockwise => {
                debug!("Rotated CCW");
                if !self.button_held {
                    return;
                }
                self.device.decrease_volume().await
            }
            InputEvent::Other => return,
        };

        if let Err(e) = result {
            warn!(
                "Volume change failed, keeping volume {}: {}",
                self.device.current_volume(),
                e
            );
        }
    }

    /// Consume `source` one event at a time until `shutdown` fires.
    ///
    /// Each event, including any volume request it triggers, completes before
    /// the next one is read. A read error (device unplugged) ends the loop.
    pub async fn run<S: EventSource>(
        &mut self,
        source: &mut S,
        rotation: RotationMatch,
        shutdown: &CancellationToken,
    ) -> Result<()> {
        info!("Listening for dial events");
        loop {
            let raw = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Dial event loop shutting down");
                    return Ok(());
                }
                raw = source.next_event() => raw.context("input device read failed")?,
            };

            trace!("{:?}", raw);
            self.handle(InputEvent::decode(raw, rotation)).await;
        }
    }
}
