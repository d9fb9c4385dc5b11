//! Console configuration file.
//!
//! Every key is optional; a missing file section falls back to the values
//! a local development backend expects.

use std::path::Path;
use std::time::Duration;

use ms_core::DeviceId;
use ms_session::{DeviceKind, DeviceRecord, default_devices};
use ms_transport::http::DEFAULT_MAX_RESPONSE_BYTES;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/v1/spectrometer";
pub const BASE_URL_ENV: &str = "METALLISENSE_API_BASE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntheticSourceKind {
    /// `POST /synthetic-reading` on the backend.
    #[default]
    Remote,
    /// Local seeded generator, no backend required.
    Seeded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    pub id: DeviceId,
    pub name: String,
    pub kind: DeviceKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub request_timeout_ms: Option<u64>,
    pub optimizer_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub max_response_bytes: usize,
    /// Derived from the session start time when unset.
    pub fallback_seed: Option<u64>,
    pub synthetic_source: SyntheticSourceKind,
    pub synthetic_seed: u64,
    pub devices: Vec<DeviceConfig>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: None,
            optimizer_timeout_ms: 10_000,
            poll_interval_ms: 2_000,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            fallback_seed: None,
            synthetic_source: SyntheticSourceKind::Remote,
            synthetic_seed: 42,
            devices: default_devices()
                .into_iter()
                .map(|d| DeviceConfig {
                    id: d.id,
                    name: d.display_name,
                    kind: d.kind,
                })
                .collect(),
        }
    }
}

impl ConsoleConfig {
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        // An empty document deserializes to unit, not to an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = base.trim().to_string();
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(AppError::Validation("base_url must not be empty".to_string()));
        }
        if self.request_timeout_ms == Some(0) {
            return Err(AppError::Validation(
                "request_timeout_ms must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("optimizer_timeout_ms", self.optimizer_timeout_ms),
            ("poll_interval_ms", self.poll_interval_ms),
            ("max_response_bytes", self.max_response_bytes as u64),
        ] {
            if value == 0 {
                return Err(AppError::Validation(format!("{} must be positive", name)));
            }
        }
        if self.devices.is_empty() {
            return Err(AppError::Validation(
                "at least one device must be configured".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn optimizer_timeout(&self) -> Duration {
        Duration::from_millis(self.optimizer_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn device_records(&self) -> Vec<DeviceRecord> {
        self.devices
            .iter()
            .map(|d| DeviceRecord::new(d.id, d.name.clone(), d.kind))
            .collect()
    }
}

/// Load, apply environment overrides and validate.
///
/// `None` starts from the defaults.
pub fn load_config(path: Option<&Path>) -> AppResult<ConsoleConfig> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
                path: path.to_path_buf(),
                source: e,
            })?;
            ConsoleConfig::from_yaml_str(&content)?
        }
        None => ConsoleConfig::default(),
    };
    config.apply_env();
    config.validate()?;
    Ok(config)
}
