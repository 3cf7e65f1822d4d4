//! # Deployment Mode Selection
//!
//! Decides, per request, whether clients are built through the central
//! authenticated broker service or directly against the broker.

use std::fmt;

use crate::config::{ConfigResolver, PaasAuthInfo};
use crate::error::ClientFactoryResult;

/// Flag value that explicitly selects service mode
pub const SERVICE_MODE_FLAG: &str = "service";

/// Flag value conventionally used for sdk mode
pub const SDK_MODE_FLAG: &str = "sdk";

/// How message clients reach the broker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentMode {
    /// Central authenticated broker-access service
    Service,
    /// Direct broker connection from locally assembled properties
    Sdk,
}

impl DeploymentMode {
    /// Map a raw mode flag to a mode.
    ///
    /// Absent, blank or `"service"` selects [`DeploymentMode::Service`]; any
    /// other non-blank value selects [`DeploymentMode::Sdk`].
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            None => Self::Service,
            Some(value) if value.trim().is_empty() || value == SERVICE_MODE_FLAG => Self::Service,
            Some(_) => Self::Sdk,
        }
    }

    pub fn from_auth_info(auth_info: &PaasAuthInfo) -> Self {
        Self::from_flag(auth_info.mode.as_deref())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => SERVICE_MODE_FLAG,
            Self::Sdk => SDK_MODE_FLAG,
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read the mode flag fresh from the resolver. Never memoized, so a changed
/// flag applies to the next request.
pub async fn resolve_mode(resolver: &dyn ConfigResolver) -> ClientFactoryResult<DeploymentMode> {
    let auth_info = resolver.auth_info().await?;
    Ok(DeploymentMode::from_auth_info(&auth_info))
}
