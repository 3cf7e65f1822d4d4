//! # Client Capability Traits
//!
//! The factory depends only on these capabilities. Concrete broker clients
//! live behind them, one connector per deployment mode.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::messaging::auth::AuthDescriptor;
use crate::messaging::errors::ConnectorResult;
use crate::messaging::properties::PropertySet;

/// A message delivered to a consumer's processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumedMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<String>,
    pub payload: Vec<u8>,
    pub received_at: DateTime<Utc>,
}

/// Application callback invoked for every consumed message
#[async_trait]
pub trait MessageProcessor: Send + Sync + 'static {
    async fn process(&self, message: &ConsumedMessage) -> ConnectorResult<()>;
}

/// Live producer handle
#[async_trait]
pub trait MessageSender: Send + Sync + fmt::Debug + 'static {
    /// Publish a payload, optionally keyed for partition affinity
    async fn send(&self, key: Option<&str>, payload: Vec<u8>) -> ConnectorResult<()>;

    /// Identifier of this client instance (for logging)
    fn client_id(&self) -> &str;
}

/// Live consumer handle
#[async_trait]
pub trait MessageConsumer: Send + Sync + fmt::Debug + 'static {
    /// Begin delivering messages to the processor
    async fn start(&self) -> ConnectorResult<()>;

    /// Stop delivery; the handle may be started again
    async fn stop(&self) -> ConnectorResult<()>;

    fn client_id(&self) -> &str;
}

pub type SenderHandle = Arc<dyn MessageSender>;
pub type ConsumerHandle = Arc<dyn MessageConsumer>;

/// Constructs clients through the central authenticated broker service
#[async_trait]
pub trait ServiceModeConnector: Send + Sync + 'static {
    async fn connect_producer(&self, auth: &AuthDescriptor) -> ConnectorResult<SenderHandle>;

    /// Consumer with the service's own default consumer identity
    async fn connect_consumer(
        &self,
        auth: &AuthDescriptor,
        processor: Arc<dyn MessageProcessor>,
    ) -> ConnectorResult<ConsumerHandle>;

    /// Consumer bound to a caller-supplied consumer identity
    async fn connect_consumer_with_id(
        &self,
        auth: &AuthDescriptor,
        processor: Arc<dyn MessageProcessor>,
        consumer_id: &str,
    ) -> ConnectorResult<ConsumerHandle>;
}

/// Constructs clients directly against the broker from property sets
#[async_trait]
pub trait SdkModeConnector: Send + Sync + 'static {
    async fn connect_producer(
        &self,
        properties: PropertySet,
        topic_id: &str,
    ) -> ConnectorResult<SenderHandle>;

    async fn connect_consumer(
        &self,
        properties: PropertySet,
        topic_id: &str,
        processor: Arc<dyn MessageProcessor>,
    ) -> ConnectorResult<ConsumerHandle>;
}
