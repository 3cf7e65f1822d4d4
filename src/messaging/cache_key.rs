//! # Cache Keys
//!
//! Keys are the identity components joined with [`KEY_SEPARATOR`]. Two
//! requests share a client iff their keys are equal within the same
//! mode/role map.

use std::fmt;

/// Separator between key components
pub const KEY_SEPARATOR: &str = ".";

/// Consumer id used when the caller did not supply one
pub const DEFAULT_CONSUMER_ID: &str = "consumer";

/// Consumer identity as supplied by the caller.
///
/// Service mode picks a different constructor depending on whether an id was
/// supplied, so the distinction is kept instead of collapsing to a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConsumerIdentity {
    Explicit(String),
    Default,
}

impl ConsumerIdentity {
    /// Missing and blank ids both fall back to the default identity
    pub fn from_option(consumer_id: Option<&str>) -> Self {
        match consumer_id {
            Some(id) if !id.trim().is_empty() => Self::Explicit(id.to_string()),
            _ => Self::Default,
        }
    }

    /// The id used in cache keys and derived paths
    pub fn as_str(&self) -> &str {
        match self {
            Self::Explicit(id) => id,
            Self::Default => DEFAULT_CONSUMER_ID,
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }
}

/// Derived identity of a cached client
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// `identity.brokerId`
    pub fn producer(identity: &str, broker_id: &str) -> Self {
        Self(format!("{identity}{KEY_SEPARATOR}{broker_id}"))
    }

    /// `identity.brokerId.consumerId`
    pub fn consumer(identity: &str, broker_id: &str, consumer: &ConsumerIdentity) -> Self {
        Self(format!(
            "{identity}{KEY_SEPARATOR}{broker_id}{KEY_SEPARATOR}{}",
            consumer.as_str()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
