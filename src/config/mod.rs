//! # PaaS Configuration
//!
//! Everything the client factory needs to know about its environment comes
//! through a [`ConfigResolver`]: the PaaS auth snapshot (including the mode
//! flag), namespace → broker mappings, broker credentials, sdk-mode property
//! sets and datasource pool settings.
//!
//! ## Sources
//!
//! [`PaasConfigResolver`] is the file-backed implementation. Settings are
//! layered with the `config` crate:
//!
//! 1. base file (`mds.toml`, `mds.yaml`, ...)
//! 2. optional environment file next to it (`mds.production.toml`)
//! 3. environment variables, `MDS__PAAS__MODE=sdk` style
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mds_client::config::{ConfigResolver, PaasConfigResolver};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = PaasConfigResolver::from_file("config/mds.toml")?;
//! let broker_id = resolver.resolve_broker_id("orders").await?;
//! # Ok(())
//! # }
//! ```

pub mod loader;
mod resolver;

use serde::{Deserialize, Serialize};

pub use loader::{LoadOptions, MdsSettings, NamespaceSettings, PaasConfigResolver};
pub use resolver::ConfigResolver;

/// Snapshot of the PaaS authentication settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaasAuthInfo {
    /// Deployment mode flag; blank or `"service"` means service mode
    #[serde(default)]
    pub mode: Option<String>,
    /// Principal id used in service-mode auth descriptors and cache keys
    #[serde(default)]
    pub principal_id: String,
    #[serde(default)]
    pub auth_url: String,
    /// Application name used in sdk-mode cache keys
    #[serde(default)]
    pub app_name: String,
}

/// Pool settings for a named SQL datasource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,
    #[serde(default)]
    pub max_lifetime_secs: Option<u64>,
    #[serde(default = "default_test_before_acquire")]
    pub test_before_acquire: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn default_test_before_acquire() -> bool {
    true
}

/// Current environment name from `MDS_ENV`, then `APP_ENV`
pub fn detect_environment() -> String {
    std::env::var("MDS_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}
