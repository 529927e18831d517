use std::{str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_POLL_INTERVAL_MS: u64 = 1_000;
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 100;

pub const ENV_DEVICE_URL: &str = "PROOFUINO_DEVICE_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "PROOFUINO_POLL_INTERVAL_MS";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "PROOFUINO_REQUEST_TIMEOUT_MS";
pub const ENV_API: &str = "PROOFUINO_API";
pub const ENV_DEV: &str = "PROOFUINO_DEV";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown api flavor '{0}', expected 'current' or 'legacy'")]
    UnknownApiFlavor(String),
    #[error("device url '{0}' must start with http://")]
    InvalidDeviceUrl(String),
}

/// Which endpoint and body shape the device expects for target updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFlavor {
    /// `POST /config` with `targetTemperature`.
    #[default]
    Current,
    /// `POST /temperature` with `desiredDoughTemperature`.
    Legacy,
}

impl ApiFlavor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Legacy => "legacy",
        }
    }
}

impl FromStr for ApiFlavor {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "current" | "config" => Ok(Self::Current),
            "legacy" | "temperature" => Ok(Self::Legacy),
            _ => Err(ConfigError::UnknownApiFlavor(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub device_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub api: ApiFlavor,
    pub dev_mode: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            device_url: "http://proofuino.local".to_string(),
            poll_interval_ms: 10_000,
            request_timeout_ms: 5_000,
            api: ApiFlavor::Current,
            dev_mode: false,
        }
    }
}

impl DashboardConfig {
    /// Overrides fields from environment-style lookups. Unparseable numbers
    /// are ignored, an unknown api flavor is an error.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_DEVICE_URL).filter(|value| !value.trim().is_empty()) {
            self.device_url = url.trim().to_string();
        }
        if let Some(ms) = lookup(ENV_POLL_INTERVAL_MS).and_then(|value| value.trim().parse().ok()) {
            self.poll_interval_ms = ms;
        }
        if let Some(ms) = lookup(ENV_REQUEST_TIMEOUT_MS).and_then(|value| value.trim().parse().ok())
        {
            self.request_timeout_ms = ms;
        }
        if let Some(api) = lookup(ENV_API) {
            self.api = api.parse()?;
        }
        if let Some(dev) = lookup(ENV_DEV) {
            self.dev_mode = matches!(
                dev.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        Ok(())
    }

    pub fn sanitize(&mut self) {
        self.poll_interval_ms = self
            .poll_interval_ms
            .clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS);
        self.request_timeout_ms = self
            .request_timeout_ms
            .clamp(MIN_REQUEST_TIMEOUT_MS, self.poll_interval_ms);
        while self.device_url.ends_with('/') {
            self.device_url.pop();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self.device_url.strip_prefix("http://").unwrap_or_default();
        if host.is_empty() {
            return Err(ConfigError::InvalidDeviceUrl(self.device_url.clone()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
