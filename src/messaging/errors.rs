//! # Connector Error Types
//!
//! Errors raised by the mode-specific client constructors and the handles they
//! return. The factory wraps these in `ClientFactoryError::ClientAcquisition`.

use thiserror::Error;

/// Failures reported by a broker connector or a live client handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Invalid client property '{key}': {message}")]
    InvalidProperty { key: String, message: String },

    #[error("Client {client_id} is closed")]
    Closed { client_id: String },

    #[error("Message processing failed: {message}")]
    Processing { message: String },
}

impl ConnectorError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create an invalid property error
    pub fn invalid_property(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidProperty {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a closed-client error
    pub fn closed(client_id: impl Into<String>) -> Self {
        Self::Closed {
            client_id: client_id.into(),
        }
    }

    /// Create a processing error
    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing {
            message: message.into(),
        }
    }
}

pub type ConnectorResult<T> = std::result::Result<T, ConnectorError>;
