//! Configuration management
//!
//! Defaults match a single Surface Dial on `/dev/input/event0` driving a
//! BluOS player at `192.168.1.7:11000`. Every value can be overridden from a
//! config file in the config directory or with `DIAL_*` environment variables
//! (`DIAL_VOLUME__MAX_LEVEL=40`, `DIAL_DEVICE__HOST=10.0.0.5`, ...).

use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::input::RotationMatch;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub volume: VolumeSettings,

    #[serde(default)]
    pub input: InputConfig,
}

/// Address of the BluOS player
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_bluos_port")]
    pub port: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_bluos_port(),
        }
    }
}

impl DeviceConfig {
    /// Base URL of the player's HTTP API (`http://host:port/`)
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("http://{}:{}/", self.host, self.port))?)
    }
}

fn default_host() -> String {
    "192.168.1.7".to_string()
}

fn default_bluos_port() -> u16 {
    11000
}

/// Volume policy applied before any request reaches the player
#[derive(Debug, Clone, Deserialize)]
pub struct VolumeSettings {
    /// Ceiling for increases (player scale is 0-100)
    #[serde(default = "default_max_level")]
    pub max_level: i32,
    /// Volume change per detent
    #[serde(default = "default_step")]
    pub step: i32,
    /// Minimum interval between accepted changes, 0 disables
    #[serde(default = "default_dead_time_ms")]
    pub dead_time_ms: u64,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            max_level: default_max_level(),
            step: default_step(),
            dead_time_ms: default_dead_time_ms(),
        }
    }
}

impl VolumeSettings {
    /// Reject settings that cannot describe a 0-100 volume scale
    pub fn validate(&self) -> Result<()> {
        if self.step <= 0 || self.step > 100 {
            bail!("volume.step must be between 1 and 100, got {}", self.step);
        }
        if !(0..=100).contains(&self.max_level) {
            bail!(
                "volume.max_level must be between 0 and 100, got {}",
                self.max_level
            );
        }
        Ok(())
    }

    pub fn dead_time(&self) -> Option<Duration> {
        (self.dead_time_ms > 0).then(|| Duration::from_millis(self.dead_time_ms))
    }
}

fn default_max_level() -> i32 {
    60
}

fn default_step() -> i32 {
    2
}

fn default_dead_time_ms() -> u64 {
    50
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_input_path")]
    pub path: PathBuf,
    /// Delay between attempts to open a missing device, 0 fails immediately
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default)]
    pub rotation: RotationMatch,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            retry_delay_secs: default_retry_delay_secs(),
            rotation: RotationMatch::default(),
        }
    }
}

impl InputConfig {
    pub fn retry_delay(&self) -> Option<Duration> {
        (self.retry_delay_secs > 0).then(|| Duration::from_secs(self.retry_delay_secs))
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("/dev/input/event0")
}

fn default_retry_delay_secs() -> u64 {
    3
}

/// Get config directory (DIAL_CONFIG_DIR, XDG_CONFIG_HOME or ~/.config)
pub fn get_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DIAL_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("dial-volume-bridge");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config/dial-volume-bridge");
    }

    PathBuf::from(".")
}

pub fn load_config() -> Result<Config> {
    let config_dir = get_config_dir();

    let config = ::config::Config::builder()
        // Load from config file if it exists (config.toml, config.json, ...)
        .add_source(
            ::config::File::with_name(&config_dir.join("config").to_string_lossy()).required(false),
        )
        // Override with environment variables (DIAL_DEVICE__HOST, DIAL_VOLUME__STEP, etc.)
        .add_source(
            ::config::Environment::with_prefix("DIAL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = config.try_deserialize()?;
    config.volume.validate()?;
    Ok(config)
}
