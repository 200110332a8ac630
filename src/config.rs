use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidOutput(other.to_string())),
        }
    }
}

/// Settings for the command-line tool, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub output: OutputFormat,
    pub report_dir: PathBuf,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let output = OutputFormat::parse(
            &env::var("CARE_RISK_OUTPUT").unwrap_or_else(|_| "text".to_string()),
        )?;
        let report_dir = env::var("CARE_RISK_REPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let log_level = env::var("CARE_RISK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            output,
            report_dir,
            telemetry: TelemetryConfig { log_level },
        })
    }

    /// Bare file names land in the report directory; anything with a
    /// directory component is used as given.
    pub fn report_path(&self, out: &Path) -> PathBuf {
        match out.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => out.to_path_buf(),
            _ => self.report_dir.join(out),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CARE_RISK_OUTPUT must be 'text' or 'json', got '{0}'")]
    InvalidOutput(String),
}
