//! Configuration resolver capability consumed by the client factory.

use async_trait::async_trait;

use super::{DataSourceConfig, PaasAuthInfo};
use crate::error::ClientFactoryResult;
use crate::messaging::properties::PropertySet;

/// Source of PaaS settings.
///
/// Implementations must return fresh values on every call; the factory reads
/// the auth snapshot once per request and never caches it.
#[async_trait]
pub trait ConfigResolver: Send + Sync + 'static {
    /// Current auth snapshot, including the deployment mode flag
    async fn auth_info(&self) -> ClientFactoryResult<PaasAuthInfo>;

    /// Broker id configured for a namespace
    async fn resolve_broker_id(&self, namespace: &str) -> ClientFactoryResult<String>;

    /// Service-mode credential for a broker
    async fn resolve_credential(&self, broker_id: &str) -> ClientFactoryResult<String>;

    /// Sdk-mode producer properties; includes the topic id
    async fn assemble_producer_properties(&self, namespace: &str)
        -> ClientFactoryResult<PropertySet>;

    /// Sdk-mode consumer properties; includes the topic id and consumer base path
    async fn assemble_consumer_properties(&self, namespace: &str)
        -> ClientFactoryResult<PropertySet>;

    /// Pool settings for a named datasource
    async fn datasource_config(&self, name: &str) -> ClientFactoryResult<DataSourceConfig>;
}
