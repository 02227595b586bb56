use async_trait::async_trait;

/// Outcome of a single volume change request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeChange {
    /// The player accepted the request. `confirmed` is what it reported back,
    /// which may differ from `requested` if the player clamped it.
    Applied { requested: i32, confirmed: i32 },
    /// Dropped because the previous change was too recent
    RateLimited,
    /// Dropped because the increase would pass the configured ceiling
    CeilingExceeded { target: i32, max: i32 },
}

/// Device whose volume can be nudged up or down one step at a time.
///
/// Callers never run two changes concurrently; implementors may rely on
/// `&mut self` for exclusive access to their cached state.
#[async_trait]
pub trait VolumeDevice: Send {
    /// Transport or protocol failure talking to the device
    type Error: std::error::Error + Send + Sync + 'static;

    async fn increase_volume(&mut self) -> Result<VolumeChange, Self::Error>;

    async fn decrease_volume(&mut self) -> Result<VolumeChange, Self::Error>;

    /// Last volume the device confirmed
    fn current_volume(&self) -> i32;
}
