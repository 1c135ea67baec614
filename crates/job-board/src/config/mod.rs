use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::applications::photo::DEFAULT_MAX_PHOTO_BYTES;
use crate::workflows::candidates::grid::PageSize;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_label(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
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
    pub storage: StorageConfig,
    pub photos: PhotoConfig,
    pub grid: GridConfig,
}

impl AppConfig {
    /// Read `APP_*` variables, after loading a `.env` file when one exists.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = setting("APP_ENV")
            .map(|value| AppEnvironment::from_label(&value))
            .unwrap_or(AppEnvironment::Development);

        let server = ServerConfig {
            host: setting("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: match setting("APP_PORT") {
                Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort)?,
                None => 3000,
            },
        };

        let telemetry = TelemetryConfig {
            log_level: setting("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        let storage = StorageConfig {
            data_dir: setting("APP_DATA_DIR").map(PathBuf::from),
        };

        let max_bytes = match setting("APP_PHOTO_MAX_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidPhotoLimit)?,
            None => DEFAULT_MAX_PHOTO_BYTES,
        };

        let page_size = match setting("APP_GRID_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .and_then(PageSize::from_rows)
                .ok_or(ConfigError::InvalidPageSize)?,
            None => PageSize::default(),
        };

        Ok(Self {
            environment,
            server,
            telemetry,
            storage,
            photos: PhotoConfig { max_bytes },
            grid: GridConfig { page_size },
        })
    }
}

/// Trimmed value of `key`; blank counts as unset.
fn setting(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::from([127, 0, 0, 1])
        } else {
            self.host
                .parse::<IpAddr>()
                .map_err(|source| ConfigError::InvalidHost { source })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where job and candidate snapshots live. `None` keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn jobs_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("job-storage.json"))
    }

    pub fn candidates_path(&self) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join("candidate-storage.json"))
    }
}

/// Upload limits enforced before the photo store is called.
#[derive(Debug, Clone)]
pub struct PhotoConfig {
    pub max_bytes: usize,
}

/// Defaults for new candidate grid sessions.
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub page_size: PageSize,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPhotoLimit,
    InvalidPageSize,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPhotoLimit => {
                write!(f, "APP_PHOTO_MAX_BYTES must be a positive integer")
            }
            ConfigError::InvalidPageSize => {
                write!(f, "APP_GRID_PAGE_SIZE must be one of 10, 25, 50 or 100")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidPhotoLimit
            | ConfigError::InvalidPageSize => None,
        }
    }
}
