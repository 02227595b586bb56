//! BluOS player adapter - volume control over the BluOS HTTP API
//!
//! The player exposes plain GET endpoints on port 11000 that answer with XML:
//!
//! ```text
//! GET /Status            → <status etag=".."> ... <volume>25</volume> ... </status>
//! GET /Volume?level=N    → <volume db="-34.5" mute="0" etag="..">25</volume>
//! ```
//!
//! The volume in the `/Volume` answer is what the player actually applied. It
//! can differ from the requested level (players clamp to 0-100 and to their own
//! configured maximum), so it is the only value ever written to the cache.

use async_trait::async_trait;
use quick_xml::de::from_str as xml_from_str;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info};
use url::Url;

use crate::adapters::{DeadTime, VolumeChange, VolumeDevice};
use crate::config::VolumeSettings;

#[derive(Debug, thiserror::Error)]
pub enum BluOsError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("player returned HTTP {0}")]
    Status(StatusCode),
    #[error("unparsable player response: {0}")]
    Parse(#[from] quick_xml::de::DeError),
    #[error("invalid player URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Volume state reported by `/Volume`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct VolumeStatus {
    #[serde(rename = "$text")]
    pub level: i32,
    #[serde(rename = "@db")]
    pub db: Option<f64>,
    #[serde(rename = "@mute", default, deserialize_with = "deserialize_flag")]
    pub muted: bool,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    volume: i32,
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw == "1" || raw.eq_ignore_ascii_case("true"))
}

/// Parse the current volume out of a `/Status` body
pub fn parse_status(xml: &str) -> Result<i32, quick_xml::de::DeError> {
    let status: StatusResponse = xml_from_str(xml)?;
    Ok(status.volume)
}

/// Parse a `/Volume` body
pub fn parse_volume(xml: &str) -> Result<VolumeStatus, quick_xml::de::DeError> {
    xml_from_str(xml)
}

/// Thin HTTP client for the BluOS endpoints this bridge uses
#[derive(Debug, Clone)]
pub struct BluOsClient {
    http: Client,
    base_url: Url,
}

impl BluOsClient {
    /// `base_url` must end with `/` (e.g. `http://192.168.1.7:11000/`)
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get(&self, url: Url) -> Result<String, BluOsError> {
        debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BluOsError::Status(status));
        }
        Ok(response.text().await?)
    }

    /// Current volume (0-100)
    pub async fn status(&self) -> Result<i32, BluOsError> {
        let xml = self.get(self.base_url.join("Status")?).await?;
        Ok(parse_status(&xml)?)
    }

    /// Ask the player to go to `level`, returning what it actually applied
    pub async fn set_volume(&self, level: i32) -> Result<VolumeStatus, BluOsError> {
        let mut url = self.base_url.join("Volume")?;
        url.query_pairs_mut()
            .append_pair("level", &level.to_string());
        let xml = self.get(url).await?;
        Ok(parse_volume(&xml)?)
    }
}

/// Local proxy for a BluOS player's volume.
///
/// Holds the last volume the player confirmed plus the policy (ceiling, step,
/// dead time) applied before anything is sent.
pub struct RemoteVolumeDevice {
    client: BluOsClient,
    current_volume: i32,
    max_level: i32,
    step: i32,
    dead_time: DeadTime,
}

impl RemoteVolumeDevice {
    /// Query the player once for its volume. Failure here is fatal for the
    /// caller; nothing is retried.
    pub async fn initialize(base_url: Url, settings: &VolumeSettings) -> Result<Self, BluOsError> {
        let client = BluOsClient::new(base_url);
        let current_volume = client.status().await?;

        let dead_time = match settings.dead_time() {
            Some(interval) => DeadTime::new(interval, Instant::now()),
            None => DeadTime::disabled(),
        };

        info!(
            "BluOS player at {} is at volume {} (max {}, step {}, dead time {:?})",
            client.base_url(),
            current_volume,
            settings.max_level,
            settings.step,
            dead_time.interval()
        );

        Ok(Self {
            client,
            current_volume,
            max_level: settings.max_level,
            step: settings.step,
            dead_time,
        })
    }

    pub fn max_level(&self) -> i32 {
        self.max_level
    }

    pub fn step(&self) -> i32 {
        self.step
    }

    /// Apply `delta` to the cached volume and send the result to the player.
    ///
    /// Increases past `max_level` are dropped without contacting the player.
    /// Decreases are not floored; the player clamps and reports back. On any
    /// error the cached volume is left untouched.
    pub async fn change_volume(&mut self, delta: i32) -> Result<VolumeChange, BluOsError> {
        if !self.dead_time.try_acquire(Instant::now()) {
            debug!("Volume change {:+} inside dead time, dropped", delta);
            return Ok(VolumeChange::RateLimited);
        }

        // Saturates so an oversized step lands on the ceiling check
        let target = self.current_volume.saturating_add(delta);
        if delta > 0 && target > self.max_level {
            info!("Exceeded max volume {} (requested {})", self.max_level, target);
            return Ok(VolumeChange::CeilingExceeded {
                target,
                max: self.max_level,
            });
        }

        let applied = self.client.set_volume(target).await?;
        if applied.level != target {
            debug!("Player applied {} instead of {}", applied.level, target);
        }
        self.current_volume = applied.level;

        info!("Volume level {}", self.current_volume);
        Ok(VolumeChange::Applied {
            requested: target,
            confirmed: applied.level,
        })
    }
}

#[async_trait]
impl VolumeDevice for RemoteVolumeDevice {
    type Error = BluOsError;

    async fn increase_volume(&mut self) -> Result<VolumeChange, BluOsError> {
        self.change_volume(self.step).await
    }

    async fn decrease_volume(&mut self) -> Result<VolumeChange, BluOsError> {
        self.change_volume(self.step.saturating_neg()).await
    }

    fn current_volume(&self) -> i32 {
        self.current_volume
    }
}
