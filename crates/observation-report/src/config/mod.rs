use std::collections::HashMap;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::observations::RoleScope;

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

/// Top-level configuration for the reporting service and CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub sources: SourceConfig,
    pub roles: RoleDirectory,
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

        let data_dir = PathBuf::from(env::var("OBS_DATA_DIR").unwrap_or_else(|_| "data".to_string()));
        let observations = required_identifier("OBS_OBSERVATIONS_SOURCE", "observations")?;
        let cutoffs = required_identifier("OBS_CUTOFFS_SOURCE", "cutoffs")?;
        let catalog = env::var("OBS_CATALOG_SOURCE")
            .unwrap_or_else(|_| "catalog".to_string())
            .trim()
            .to_string();
        let catalog = (!catalog.is_empty()).then_some(catalog);

        let cache_ttl = env::var("OBS_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "600".to_string())
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidCacheTtl)?;

        let roles = RoleDirectory::parse(&env::var("OBS_ROLE_PROGRAMS").unwrap_or_default())?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
                include_targets: environment != AppEnvironment::Production,
                stderr: false,
            },
            sources: SourceConfig {
                data_dir,
                observations,
                cutoffs,
                catalog,
                cache_ttl,
            },
            roles,
        })
    }
}

fn required_identifier(key: &'static str, default: &str) -> Result<String, ConfigError> {
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingSource(key));
    }
    Ok(trimmed.to_string())
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
    pub include_targets: bool,
    /// Write logs to stderr so CLI output on stdout stays machine-readable.
    pub stderr: bool,
}

/// Where the observation, cutoff, and catalog tables come from.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub data_dir: PathBuf,
    pub observations: String,
    pub cutoffs: String,
    /// `None` runs without a program catalog; service names stay as typed.
    pub catalog: Option<String>,
    pub cache_ttl: Duration,
}

/// Roles pinned to a single program. Roles absent from the map see every program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDirectory {
    pinned: HashMap<String, String>,
}

impl RoleDirectory {
    /// Parses `role=program_id` pairs separated by commas.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut pinned = HashMap::new();
        for pair in raw.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
            let Some((role, program)) = pair.split_once('=') else {
                return Err(ConfigError::InvalidRoleMapping(pair.to_string()));
            };
            let (role, program) = (role.trim(), program.trim());
            if role.is_empty() || program.is_empty() {
                return Err(ConfigError::InvalidRoleMapping(pair.to_string()));
            }
            pinned.insert(role.to_ascii_lowercase(), program.to_string());
        }
        Ok(Self { pinned })
    }

    pub fn scope_for(&self, role: Option<&str>) -> RoleScope {
        role.map(|role| role.trim().to_ascii_lowercase())
            .and_then(|role| self.pinned.get(&role).cloned())
            .map(RoleScope::Program)
            .unwrap_or(RoleScope::Unrestricted)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCacheTtl,
    MissingSource(&'static str),
    InvalidRoleMapping(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCacheTtl => {
                write!(f, "OBS_CACHE_TTL_SECS must be a whole number of seconds")
            }
            ConfigError::MissingSource(key) => {
                write!(f, "{key} must name a source; it is set but empty")
            }
            ConfigError::InvalidRoleMapping(pair) => {
                write!(f, "OBS_ROLE_PROGRAMS entry '{pair}' is not role=program_id")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
