use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::policy::ErrorPolicy;

/// Demo runner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub logging: LoggingConfig,
    pub interval: IntervalConfig,
    pub event_source: EventSourceConfig,
    pub errors: ErrorsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalConfig {
    pub period_ms: u64,
    pub take: usize,
    /// How long `on-next` watches the timer before cancelling it
    pub window_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSourceConfig {
    /// How long the feeder pushes ticks before closing the channel
    pub window_ms: u64,
    pub capacity: usize,
    pub take: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorsConfig {
    pub policy: ErrorPolicy,
    pub max_retries: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            period_ms: 1000,
            take: 5,
            window_ms: 5000,
        }
    }
}

impl Default for EventSourceConfig {
    fn default() -> Self {
        Self {
            window_ms: 3000,
            capacity: 1,
            take: 5,
        }
    }
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self {
            policy: ErrorPolicy::Fail,
            max_retries: 3,
        }
    }
}

impl DemoConfig {
    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: DemoConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval.period_ms == 0 {
            bail!("interval.period_ms must be greater than zero");
        }
        if self.event_source.capacity == 0 {
            bail!("event_source.capacity must be greater than zero");
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.interval.period_ms)
    }

    pub fn interval_window(&self) -> Duration {
        Duration::from_millis(self.interval.window_ms)
    }

    pub fn source_window(&self) -> Duration {
        Duration::from_millis(self.event_source.window_ms)
    }
}
