//! Service-mode authentication descriptor.

use std::fmt;

/// Credentials handed to the service-mode constructors
#[derive(Clone, PartialEq, Eq)]
pub struct AuthDescriptor {
    pub auth_url: String,
    pub principal_id: String,
    pub credential: String,
    pub broker_id: String,
}

impl AuthDescriptor {
    pub fn new(
        auth_url: impl Into<String>,
        principal_id: impl Into<String>,
        credential: impl Into<String>,
        broker_id: impl Into<String>,
    ) -> Self {
        Self {
            auth_url: auth_url.into(),
            principal_id: principal_id.into(),
            credential: credential.into(),
            broker_id: broker_id.into(),
        }
    }
}

// Credential stays out of logs
impl fmt::Debug for AuthDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthDescriptor")
            .field("auth_url", &self.auth_url)
            .field("principal_id", &self.principal_id)
            .field("credential", &"***")
            .field("broker_id", &self.broker_id)
            .finish()
    }
}
