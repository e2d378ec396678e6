//! Configuration loading and management
//!
//! Loading order: built-in defaults, then the YAML file named by
//! `MEDSTOCK_CONFIG` (if set), then individual environment overrides.

use crate::core::auth::{
    AuthProvider, DemoAuthProvider, NoAuthProvider, TrustedHeaderAuthProvider, User,
};
use crate::core::error::ConfigError;
use crate::entities::DashboardSettings;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// Accepted range for `dashboard.expiry_window_days`
pub const EXPIRY_WINDOW_DAYS: std::ops::RangeInclusive<u32> = 1..=3650;

/// Environment variable naming the YAML configuration file
pub const CONFIG_PATH_VAR: &str = "MEDSTOCK_CONFIG";

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which document store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Mongodb,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "in-memory" | "memory" => Ok(StorageBackend::InMemory),
            "mongodb" | "mongo" => Ok(StorageBackend::Mongodb),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Connection string for networked backends
    pub uri: String,
    pub database: String,
    /// Load the demo inventory and roster at startup
    pub seed_demo_data: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::InMemory,
            uri: "mongodb://localhost:27017".to_string(),
            database: "medstock".to_string(),
            seed_demo_data: true,
        }
    }
}

/// How the caller's identity is established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Every request acts as `demo_user`. Development only.
    #[default]
    Demo,
    /// Identity comes from `X-User-*` headers set by a trusted gateway
    TrustedHeaders,
    /// Nobody is authenticated; every API request is rejected
    None,
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(AuthMode::Demo),
            "trusted_headers" | "trusted-headers" => Ok(AuthMode::TrustedHeaders),
            "none" => Ok(AuthMode::None),
            other => Err(format!("unknown auth mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub demo_user: User,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::Demo,
            demo_user: User::demo(),
        }
    }
}

impl AuthConfig {
    /// Build the provider for the configured mode
    pub fn provider(&self) -> Arc<dyn AuthProvider> {
        match self.mode {
            AuthMode::Demo => {
                warn!(
                    user = %self.demo_user.id,
                    "demo authentication enabled, every request is trusted"
                );
                Arc::new(DemoAuthProvider::new(self.demo_user.clone()))
            }
            AuthMode::TrustedHeaders => Arc::new(TrustedHeaderAuthProvider),
            AuthMode::None => Arc::new(NoAuthProvider),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub expiry_window_days: u32,
    pub recent_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            expiry_window_days: 30,
            recent_limit: 5,
        }
    }
}

impl DashboardConfig {
    pub fn settings(&self) -> DashboardSettings {
        DashboardSettings {
            expiry_window: Duration::days(i64::from(self.expiry_window_days)),
            recent_limit: self.recent_limit,
        }
    }
}

/// Complete service configuration
///
/// Every section has defaults, so an empty document is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub dashboard: DashboardConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::IoError {
                message: format!("{}: {}", path, e),
            },
        })?;

        Self::from_yaml_str(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                file: Some(path.to_string()),
                message,
            },
            other => other,
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yaml reads an empty document as null, not as an empty map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) => {
                info!("Loading configuration from {}", path);
                Self::from_yaml_file(&path)?
            }
            None => {
                info!("{} not set, using default configuration", CONFIG_PATH_VAR);
                Self::default()
            }
        };

        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MEDSTOCK_*` environment overrides
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("MEDSTOCK_HOST") {
            self.server.host = host;
        }
        if let Some(port) = try_parse(&lookup, "MEDSTOCK_PORT")? {
            self.server.port = port;
        }
        if let Some(backend) = try_parse(&lookup, "MEDSTOCK_STORAGE_BACKEND")? {
            self.storage.backend = backend;
        }
        if let Some(uri) = lookup("MEDSTOCK_MONGODB_URI") {
            self.storage.uri = uri;
        }
        if let Some(mode) = try_parse(&lookup, "MEDSTOCK_AUTH_MODE")? {
            self.auth.mode = mode;
        }
        Ok(())
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(invalid("server.host", &self.server.host, "must not be empty"));
        }
        if self.storage.backend == StorageBackend::Mongodb && self.storage.uri.trim().is_empty() {
            return Err(invalid(
                "storage.uri",
                &self.storage.uri,
                "required when backend is mongodb",
            ));
        }
        let window = self.dashboard.expiry_window_days;
        if !EXPIRY_WINDOW_DAYS.contains(&window) {
            return Err(invalid(
                "dashboard.expiry_window_days",
                &window.to_string(),
                &format!(
                    "must be between {} and {}",
                    EXPIRY_WINDOW_DAYS.start(),
                    EXPIRY_WINDOW_DAYS.end()
                ),
            ));
        }
        if self.dashboard.recent_limit == 0 {
            return Err(invalid("dashboard.recent_limit", "0", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

fn try_parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };

    raw.trim().parse().map(Some).map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        invalid(key, &raw, &e.to_string())
    })
}
