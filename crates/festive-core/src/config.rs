use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::backend::LAG_RANGE;
use crate::error::{DashboardError, Result};
use crate::types::DateWindow;

pub const DEFAULT_CONFIG_FILE: &str = "festive.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

impl fmt::Display for WarnLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WarnLevel::Warning => "warning",
            WarnLevel::Error => "error",
        })
    }
}

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// The full-year window restored by `reset` and by selecting `all`.
    #[serde(default = "default_window")]
    pub default_window: DateWindow,
    #[serde(default = "default_lag")]
    pub default_lag: i64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_window() -> DateWindow {
    DateWindow {
        start: chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
        end: chrono::NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default(),
    }
}

fn default_lag() -> i64 {
    3
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            default_window: default_window(),
            default_lag: default_lag(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl DashboardConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&data)
    }

    pub fn from_yaml_str(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: DashboardConfig = serde_yaml::from_str(data)?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The default window, checked. Errors if the configured range is inverted.
    pub fn checked_default_window(&self) -> Result<DateWindow> {
        DateWindow::new(self.default_window.start, self.default_window.end)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Err(DashboardError::InvalidRange { start, end }) = self.checked_default_window() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("default_window starts after it ends ({start} > {end})"),
            });
        }

        if !LAG_RANGE.contains(&self.default_lag) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "default_lag {} is outside {}..={}",
                    self.default_lag,
                    LAG_RANGE.start(),
                    LAG_RANGE.end()
                ),
            });
        }

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("api_url '{}' is not an http(s) URL", self.api_url),
            });
        }

        if self.request_timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "request_timeout_secs is 0; every request will time out".to_string(),
            });
        }

        warnings
    }

    pub fn has_errors(&self) -> bool {
        self.validate().iter().any(|w| w.level == WarnLevel::Error)
    }
}
