use std::env;
use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::matching::EngineConfig;

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

/// Top-level configuration for the ranking service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub catalog: CatalogConfig,
    pub ranking: RankingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let universities_path = env::var("UNIS_PATH")
            .unwrap_or_else(|_| "./normalized/universities_normalized.json".to_string());
        let students_path = env::var("STUDENTS_PATH")
            .unwrap_or_else(|_| "./normalized/students_normalized.json".to_string());

        let seed = match env::var("RANKING_SEED") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeed { value: raw })?,
            Err(_) => 42,
        };
        let engine_config_path = env::var("ENGINE_CONFIG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            catalog: CatalogConfig {
                universities_path: PathBuf::from(universities_path),
                students_path: PathBuf::from(students_path),
            },
            ranking: RankingConfig {
                seed,
                engine_config_path,
            },
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

/// Log filter and output styling.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Locations of the normalized catalog and student stores.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub universities_path: PathBuf,
    pub students_path: PathBuf,
}

/// Session seeding and optional engine parameter overrides.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub seed: u64,
    pub engine_config_path: Option<PathBuf>,
}

impl RankingConfig {
    /// Engine parameters from `ENGINE_CONFIG_PATH`, or the built-in defaults.
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let Some(path) = &self.engine_config_path else {
            return Ok(EngineConfig::default());
        };

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::EngineConfigRead {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::EngineConfigParse {
            path: path.clone(),
            source,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSeed { value: String },
    EngineConfigRead { path: PathBuf, source: std::io::Error },
    EngineConfigParse { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSeed { value } => {
                write!(f, "RANKING_SEED must be an unsigned integer (found '{value}')")
            }
            ConfigError::EngineConfigRead { path, .. } => {
                write!(f, "unable to read engine config {}", path.display())
            }
            ConfigError::EngineConfigParse { path, .. } => {
                write!(f, "engine config {} is not valid JSON", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidSeed { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::EngineConfigRead { source, .. } => Some(source),
            ConfigError::EngineConfigParse { source, .. } => Some(source),
        }
    }
}
