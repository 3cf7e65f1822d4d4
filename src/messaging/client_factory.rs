//! # Client Factory
//!
//! Resolves or lazily constructs exactly one long-lived producer or consumer
//! per cache key, routing construction through the deployment mode that is
//! configured at the time of the request.
//!
//! ## Flow
//!
//! ```text
//! get_sender / get_consumer
//!   -> namespace check           (blank -> Configuration)
//!   -> auth snapshot + mode      (fresh read every call)
//!   -> broker id + cache key
//!   -> ClientCaches[role][mode]  (hit -> shared handle)
//!   -> miss: assemble parameters, call the mode's connector
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mds_client::config::PaasConfigResolver;
//! use mds_client::messaging::{ClientFactory, InMemoryConnector};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = Arc::new(PaasConfigResolver::from_file("config/mds.toml")?);
//! let connector = Arc::new(InMemoryConnector::new());
//! let factory = ClientFactory::new(resolver, connector.clone(), connector);
//!
//! let sender = factory.get_sender("orders").await?;
//! sender.send(Some("order-42"), b"{}".to_vec()).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::info;

use super::auth::AuthDescriptor;
use super::cache_key::{CacheKey, ConsumerIdentity};
use super::client_cache::{ClientCacheStats, ClientCaches};
use super::clients::{
    ConsumerHandle, MessageProcessor, SdkModeConnector, SenderHandle, ServiceModeConnector,
};
use super::errors::ConnectorResult;
use super::mode::DeploymentMode;
use crate::config::{ConfigResolver, PaasAuthInfo};
use crate::error::{ClientFactoryError, ClientFactoryResult};
use crate::logging::log_client_operation;

/// Mode-aware, caching factory for message clients.
///
/// Construct once at startup and share it (usually behind an `Arc`); every
/// instance owns its own cache.
pub struct ClientFactory {
    resolver: Arc<dyn ConfigResolver>,
    service: Arc<dyn ServiceModeConnector>,
    sdk: Arc<dyn SdkModeConnector>,
    caches: ClientCaches,
}

impl std::fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientFactory")
            .field("caches", &self.caches.stats())
            .finish()
    }
}

impl ClientFactory {
    pub fn new(
        resolver: Arc<dyn ConfigResolver>,
        service: Arc<dyn ServiceModeConnector>,
        sdk: Arc<dyn SdkModeConnector>,
    ) -> Self {
        Self {
            resolver,
            service,
            sdk,
            caches: ClientCaches::new(),
        }
    }

    /// Producer client for a namespace
    pub async fn get_sender(&self, namespace: &str) -> ClientFactoryResult<SenderHandle> {
        ensure_namespace(namespace)?;
        let auth_info = self.resolver.auth_info().await?;

        match DeploymentMode::from_auth_info(&auth_info) {
            DeploymentMode::Service => self.sender_by_service_mode(namespace, &auth_info).await,
            DeploymentMode::Sdk => self.sender_by_sdk_mode(namespace, &auth_info).await,
        }
    }

    /// Consumer client for a namespace.
    ///
    /// A missing or blank `consumer_id` uses the default identity
    /// (`"consumer"`) for keying.
    pub async fn get_consumer(
        &self,
        namespace: &str,
        processor: Arc<dyn MessageProcessor>,
        consumer_id: Option<&str>,
    ) -> ClientFactoryResult<ConsumerHandle> {
        ensure_namespace(namespace)?;
        let auth_info = self.resolver.auth_info().await?;
        let identity = ConsumerIdentity::from_option(consumer_id);

        match DeploymentMode::from_auth_info(&auth_info) {
            DeploymentMode::Service => {
                self.consumer_by_service_mode(namespace, &auth_info, processor, identity)
                    .await
            }
            DeploymentMode::Sdk => {
                self.consumer_by_sdk_mode(namespace, &auth_info, processor, identity)
                    .await
            }
        }
    }

    /// Mode that the next request would use
    pub async fn current_mode(&self) -> ClientFactoryResult<DeploymentMode> {
        super::mode::resolve_mode(self.resolver.as_ref()).await
    }

    pub fn cache_stats(&self) -> ClientCacheStats {
        self.caches.stats()
    }

    async fn sender_by_service_mode(
        &self,
        namespace: &str,
        auth_info: &PaasAuthInfo,
    ) -> ClientFactoryResult<SenderHandle> {
        let mode = DeploymentMode::Service;
        let broker_id = self.resolver.resolve_broker_id(namespace).await?;
        let key = CacheKey::producer(&auth_info.principal_id, &broker_id);

        self.caches
            .senders(mode)
            .get_or_try_init(&key, || async {
                let auth = self.auth_descriptor(auth_info, &broker_id).await?;
                let result = self.service.connect_producer(&auth).await;
                self.finish("connect_producer", mode, namespace, &broker_id, &key, result)
            })
            .await
    }

    async fn sender_by_sdk_mode(
        &self,
        namespace: &str,
        auth_info: &PaasAuthInfo,
    ) -> ClientFactoryResult<SenderHandle> {
        let mode = DeploymentMode::Sdk;
        let broker_id = self.resolver.resolve_broker_id(namespace).await?;
        let key = CacheKey::producer(&auth_info.app_name, &broker_id);
        log_auth_snapshot(auth_info);

        self.caches
            .senders(mode)
            .get_or_try_init(&key, || async {
                let properties = self.resolver.assemble_producer_properties(namespace).await?;
                let topic_id = properties.topic_id()?.to_string();
                let result = self.sdk.connect_producer(properties, &topic_id).await;
                self.finish("connect_producer", mode, namespace, &broker_id, &key, result)
            })
            .await
    }

    async fn consumer_by_service_mode(
        &self,
        namespace: &str,
        auth_info: &PaasAuthInfo,
        processor: Arc<dyn MessageProcessor>,
        identity: ConsumerIdentity,
    ) -> ClientFactoryResult<ConsumerHandle> {
        let mode = DeploymentMode::Service;
        let broker_id = self.resolver.resolve_broker_id(namespace).await?;
        let key = CacheKey::consumer(&auth_info.principal_id, &broker_id, &identity);

        self.caches
            .consumers(mode)
            .get_or_try_init(&key, || async {
                let auth = self.auth_descriptor(auth_info, &broker_id).await?;
                // The no-id constructor lets the service pick its own identity
                let result = match &identity {
                    ConsumerIdentity::Explicit(consumer_id) => {
                        self.service
                            .connect_consumer_with_id(&auth, processor, consumer_id)
                            .await
                    }
                    ConsumerIdentity::Default => {
                        self.service.connect_consumer(&auth, processor).await
                    }
                };
                self.finish("connect_consumer", mode, namespace, &broker_id, &key, result)
            })
            .await
    }

    async fn consumer_by_sdk_mode(
        &self,
        namespace: &str,
        auth_info: &PaasAuthInfo,
        processor: Arc<dyn MessageProcessor>,
        identity: ConsumerIdentity,
    ) -> ClientFactoryResult<ConsumerHandle> {
        let mode = DeploymentMode::Sdk;
        let consumer_id = identity.as_str();
        let broker_id = self.resolver.resolve_broker_id(namespace).await?;
        let key = CacheKey::consumer(&auth_info.app_name, &broker_id, &identity);
        log_auth_snapshot(auth_info);

        self.caches
            .consumers(mode)
            .get_or_try_init(&key, || async {
                let mut properties = self.resolver.assemble_consumer_properties(namespace).await?;
                let topic_id = properties.topic_id()?.to_string();
                properties.inject_consumer_paths(consumer_id)?;

                let result = self
                    .sdk
                    .connect_consumer(properties, &topic_id, processor)
                    .await;
                self.finish("connect_consumer", mode, namespace, &broker_id, &key, result)
            })
            .await
    }

    async fn auth_descriptor(
        &self,
        auth_info: &PaasAuthInfo,
        broker_id: &str,
    ) -> ClientFactoryResult<AuthDescriptor> {
        let credential = self.resolver.resolve_credential(broker_id).await?;
        Ok(AuthDescriptor::new(
            &auth_info.auth_url,
            &auth_info.principal_id,
            credential,
            broker_id,
        ))
    }

    /// Log the constructor outcome and wrap failures with the broker id
    fn finish<H>(
        &self,
        operation: &str,
        mode: DeploymentMode,
        namespace: &str,
        broker_id: &str,
        key: &CacheKey,
        result: ConnectorResult<H>,
    ) -> ClientFactoryResult<H> {
        match result {
            Ok(handle) => {
                log_client_operation(
                    operation,
                    mode,
                    namespace,
                    broker_id,
                    key.as_str(),
                    "created",
                    None,
                );
                Ok(handle)
            }
            Err(source) => {
                let details = source.to_string();
                log_client_operation(
                    operation,
                    mode,
                    namespace,
                    broker_id,
                    key.as_str(),
                    "failed",
                    Some(&details),
                );
                Err(ClientFactoryError::client_acquisition(broker_id, source))
            }
        }
    }
}

fn ensure_namespace(namespace: &str) -> ClientFactoryResult<()> {
    if namespace.trim().is_empty() {
        return Err(ClientFactoryError::configuration(
            "ClientFactory",
            "a message namespace is required",
        ));
    }
    Ok(())
}

fn log_auth_snapshot(auth_info: &PaasAuthInfo) {
    info!(
        auth_info = %serde_json::to_string(auth_info)
            .unwrap_or_else(|_| "[serialization error]".to_string()),
        "Resolving sdk-mode client"
    );
}
