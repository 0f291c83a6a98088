use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Where and how loudly the backend logs.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub environment: String,
    pub level: LogLevel,
    pub directory: PathBuf,
}

impl LogConfig {
    /// Read `ENVIRONMENT`, `LOG_LEVEL` and `LOG_DIR`.
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("ENVIRONMENT").ok(),
            std::env::var("LOG_LEVEL").ok(),
            std::env::var("LOG_DIR").ok(),
        )
    }

    fn from_values(
        environment: Option<String>,
        level: Option<String>,
        directory: Option<String>,
    ) -> Self {
        let environment = environment
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "development".to_string());
        let fallback = if environment == "production" {
            LogLevel::Info
        } else {
            LogLevel::Debug
        };
        let level = level.and_then(|l| l.parse().ok()).unwrap_or(fallback);

        Self {
            environment,
            level,
            directory: PathBuf::from(directory.unwrap_or_else(|| "logs".to_string())),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Default `EnvFilter` directives when `RUST_LOG` is unset.
    pub fn filter_directives(&self) -> String {
        format!(
            "site_builder_backend={},tower_http={},axum={},sqlx=warn",
            self.level, self.level, self.level
        )
    }
}
