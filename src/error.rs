//! # Client Factory Errors
//!
//! Structured error types for client acquisition, configuration resolution and
//! datasource setup, using thiserror instead of `Box<dyn Error>` patterns.

use crate::messaging::errors::ConnectorError;
use thiserror::Error;

/// Errors surfaced by the client factory and its collaborators
#[derive(Error, Debug)]
pub enum ClientFactoryError {
    /// Caller input or resolved configuration is unusable
    #[error("Configuration error: {component}: {message}")]
    Configuration { component: String, message: String },

    /// The underlying client constructor failed
    #[error("Unable to acquire client instance for message service [{broker_id}]: {source}")]
    ClientAcquisition {
        broker_id: String,
        #[source]
        source: ConnectorError,
    },

    /// Layered configuration could not be loaded or deserialized
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    /// A pooled datasource could not be opened
    #[error("Datasource [{name}] unavailable: {source}")]
    DataSource {
        name: String,
        #[source]
        source: sqlx::Error,
    },
}

impl ClientFactoryError {
    /// Create a configuration error
    pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Wrap a constructor failure with the broker id it was acquiring
    pub fn client_acquisition(broker_id: impl Into<String>, source: ConnectorError) -> Self {
        Self::ClientAcquisition {
            broker_id: broker_id.into(),
            source,
        }
    }

    /// Wrap a pool failure with the datasource name
    pub fn data_source(name: impl Into<String>, source: sqlx::Error) -> Self {
        Self::DataSource {
            name: name.into(),
            source,
        }
    }

    /// Whether this error was caused by caller input or configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::ConfigLoad(_))
    }

    /// Broker id attached to an acquisition failure
    pub fn broker_id(&self) -> Option<&str> {
        match self {
            Self::ClientAcquisition { broker_id, .. } => Some(broker_id),
            _ => None,
        }
    }
}

pub type ClientFactoryResult<T> = std::result::Result<T, ClientFactoryError>;
