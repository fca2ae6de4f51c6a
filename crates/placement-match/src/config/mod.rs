use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::matching::{EngineWeights, WeightsError};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub engine: EngineSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            engine: EngineSettings::load()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Matching engine tuning sourced from the environment.
///
/// Weight overrides are applied on top of the documented defaults, so a
/// deployment can adjust a single component without restating the rest.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub weights: EngineWeights,
    /// Worker cap for batch ranking; `None` follows available parallelism.
    pub max_workers: Option<usize>,
    /// Wall-clock budget for a ranking batch.
    pub deadline: Option<Duration>,
}

impl EngineSettings {
    fn load() -> Result<Self, ConfigError> {
        let defaults = EngineWeights::default();
        let skill = env_f64("MATCH_WEIGHT_SKILL")?.unwrap_or(defaults.skill);
        let keyword = env_f64("MATCH_WEIGHT_KEYWORD")?.unwrap_or(defaults.keyword);
        let experience = env_f64("MATCH_WEIGHT_EXPERIENCE")?.unwrap_or(defaults.experience);
        let format = env_f64("MATCH_WEIGHT_FORMAT")?.unwrap_or(defaults.format);

        let weights = EngineWeights::new(skill, keyword, experience, format)
            .map_err(|source| ConfigError::InvalidWeights { source })?;

        let max_workers = match env::var("MATCH_RANKING_MAX_WORKERS") {
            Ok(raw) => {
                let workers = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidWorkerCount)?;
                if workers == 0 {
                    return Err(ConfigError::InvalidWorkerCount);
                }
                Some(workers)
            }
            Err(_) => None,
        };

        let deadline = match env::var("MATCH_RANKING_DEADLINE_MS") {
            Ok(raw) => {
                let millis = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidDeadline)?;
                if millis == 0 {
                    return Err(ConfigError::InvalidDeadline);
                }
                Some(Duration::from_millis(millis))
            }
            Err(_) => None,
        };

        Ok(Self {
            weights,
            max_workers,
            deadline,
        })
    }
}

fn env_f64(var: &'static str) -> Result<Option<f64>, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidWeight { var }),
        Err(_) => Ok(None),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidWeight { var: &'static str },
    InvalidWeights { source: WeightsError },
    InvalidWorkerCount,
    InvalidDeadline,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidWeight { var } => {
                write!(f, "{var} must be a decimal number")
            }
            ConfigError::InvalidWeights { source } => {
                write!(f, "engine weights rejected: {source}")
            }
            ConfigError::InvalidWorkerCount => {
                write!(f, "MATCH_RANKING_MAX_WORKERS must be a positive integer")
            }
            ConfigError::InvalidDeadline => {
                write!(f, "MATCH_RANKING_DEADLINE_MS must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidWeights { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidWeight { .. }
            | ConfigError::InvalidWorkerCount
            | ConfigError::InvalidDeadline => None,
        }
    }
}
