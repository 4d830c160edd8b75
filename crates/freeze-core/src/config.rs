//! Configuration loaded from a TOML file.
//!
//! Every section has defaults, so an empty file is a valid config.
//! `FREEZE_OFFSEASON` overrides `scheduler.offseason`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt};

use crate::app::executor::DEFAULT_PACING;
use crate::domain::UserId;

pub const OFFSEASON_ENV: &str = "FREEZE_OFFSEASON";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub channels: ChannelConfig,
    pub operator: OperatorConfig,
    pub executor: ExecutorConfig,
    pub resolver: ResolverConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_interval_secs: u64,
    /// When set, every tick is skipped.
    pub offseason: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 60,
            offseason: false,
        }
    }
}

impl SchedulerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

/// Channel names used by the notifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub announcements: String,
    pub transaction_log: String,
    pub weekly_info: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            announcements: "announcements".into(),
            transaction_log: "transaction-log".into(),
            weekly_info: "weekly-info".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    /// Who receives scheduler error alerts. No alerts when unset.
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub pacing_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            pacing_ms: DEFAULT_PACING.as_millis() as u64,
        }
    }
}

impl ExecutorConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Fixed tiebreak seed; entropy when unset.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl LoggingConfig {
    /// Initialize the tracing subscriber. `RUST_LOG` wins over `level`.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&raw)?.finish()
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().finish()
    }

    fn finish(mut self) -> Result<Self, ConfigError> {
        self.apply_env_overrides(std::env::var(OFFSEASON_ENV).ok().as_deref())?;
        self.validate()?;
        Ok(self)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(ConfigError::Parse)
    }

    fn apply_env_overrides(&mut self, offseason: Option<&str>) -> Result<(), ConfigError> {
        if let Some(value) = offseason {
            self.scheduler.offseason = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(ConfigError::InvalidValue {
                        field: OFFSEASON_ENV,
                        reason: format!("expected a boolean, got {other:?}"),
                    });
                }
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // hour 0 の窓を取りこぼさないよう、少なくとも 1 時間に 1 回は tick する
        if self.scheduler.tick_interval_secs == 0 || self.scheduler.tick_interval_secs > 3600 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.tick_interval_secs",
                reason: format!(
                    "must be between 1 and 3600, got {}",
                    self.scheduler.tick_interval_secs
                ),
            });
        }
        if self.logging.format != "pretty" && self.logging.format != "json" {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected \"pretty\" or \"json\", got {:?}", self.logging.format),
            });
        }
        Ok(())
    }
}
