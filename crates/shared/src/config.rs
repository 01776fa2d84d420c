//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Object storage configuration.
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Object storage settings as read from the environment.
///
/// Which fields are required depends on `provider`:
/// - `s3`: `bucket`, `region`, `access_key_id`, `secret_access_key`, optional `endpoint`
/// - `azure_blob`: `account`, `access_key`, `bucket` (container name)
/// - `local`: `root`
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Provider name: `s3`, `azure_blob` or `local`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Bucket (S3) or container (Azure) name.
    #[serde(default)]
    pub bucket: String,
    /// S3 region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom S3 endpoint (R2, MinIO, ...). AWS is used when absent.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// S3 access key ID.
    #[serde(default)]
    pub access_key_id: String,
    /// S3 secret access key.
    #[serde(default)]
    pub secret_access_key: String,
    /// Azure storage account name.
    #[serde(default)]
    pub account: String,
    /// Azure storage access key.
    #[serde(default)]
    pub access_key: String,
    /// Root directory for the local provider.
    #[serde(default)]
    pub root: Option<String>,
    /// Maximum accepted image size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Lifetime of signed image URLs in seconds.
    #[serde(default = "default_url_ttl")]
    pub url_ttl_secs: u64,
}

fn default_provider() -> String {
    "s3".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_url_ttl() -> u64 {
    3600 // 1 hour
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("QUILL").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
