use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub carrier: CarrierConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub marketplace: Option<MarketplaceConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
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

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("labelbridge.db")
}

/// Carrier (label-printing) API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CarrierConfig {
    /// Carrier API base URL (e.g., "https://api.cdek.ru/v2")
    pub base_url: String,
    /// Timeout for auth/submit/poll requests in seconds (default: 30)
    #[serde(default = "default_carrier_timeout")]
    pub timeout_secs: u32,
    /// Timeout for document downloads in seconds (default: 60)
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u32,
}

fn default_carrier_timeout() -> u32 {
    30
}

fn default_download_timeout() -> u32 {
    60
}

/// Label workflow configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Maximum tracking numbers per print job (carrier-imposed ceiling)
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Number of status polls before giving up on a job
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
    /// Delay between status polls in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Copies of each label to print
    #[serde(default = "default_copy_count")]
    pub copy_count: u32,
    /// Page format requested from the carrier
    #[serde(default = "default_page_format")]
    pub page_format: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            poll_attempts: default_poll_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
            copy_count: default_copy_count(),
            page_format: default_page_format(),
        }
    }
}

fn default_max_batch_size() -> usize {
    100
}

fn default_poll_attempts() -> u32 {
    15
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_copy_count() -> u32 {
    1
}

fn default_page_format() -> String {
    "A6".to_string()
}

/// Marketplace order API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketplaceConfig {
    /// Marketplace seller API base URL
    pub base_url: String,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_marketplace_timeout")]
    pub timeout_secs: u32,
    /// How far back to look for awaiting-shipment orders (default: 30 days)
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    /// Page size for the posting list endpoint (default: 100)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_marketplace_timeout() -> u32 {
    10
}

fn default_window_days() -> u32 {
    30
}

fn default_page_size() -> u32 {
    100
}

/// Sanitized config for API responses. Account credentials live in the
/// database, not here, so this mostly mirrors the endpoints and tunables.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub carrier: SanitizedCarrierConfig,
    pub workflow: WorkflowConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketplace: Option<SanitizedMarketplaceConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCarrierConfig {
    pub base_url: String,
    pub timeout_secs: u32,
    pub download_timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMarketplaceConfig {
    pub base_url: String,
    pub timeout_secs: u32,
    pub window_days: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            carrier: SanitizedCarrierConfig {
                base_url: config.carrier.base_url.clone(),
                timeout_secs: config.carrier.timeout_secs,
                download_timeout_secs: config.carrier.download_timeout_secs,
            },
            workflow: config.workflow.clone(),
            marketplace: config.marketplace.as_ref().map(|m| {
                SanitizedMarketplaceConfig {
                    base_url: m.base_url.clone(),
                    timeout_secs: m.timeout_secs,
                    window_days: m.window_days,
                }
            }),
        }
    }
}
