//! # In-Memory Connectors
//!
//! Process-local implementation of both connector capabilities for testing and
//! local development.
//!
//! ## Features
//!
//! - **Construction log**: every constructor call is recorded with its inputs
//! - **Failure injection**: the next N constructions can be made to fail
//! - **Connect latency**: an optional delay widens race windows in tests
//! - **Dispatch**: consumers hand messages to their processor on demand

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::traits::{
    ConsumedMessage, ConsumerHandle, MessageConsumer, MessageProcessor, MessageSender,
    SdkModeConnector, SenderHandle, ServiceModeConnector,
};
use crate::messaging::auth::AuthDescriptor;
use crate::messaging::errors::{ConnectorError, ConnectorResult};
use crate::messaging::properties::PropertySet;

/// A recorded constructor invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructionCall {
    ServiceProducer {
        broker_id: String,
        principal_id: String,
    },
    /// `consumer_id` is `None` when the no-id constructor was used
    ServiceConsumer {
        broker_id: String,
        consumer_id: Option<String>,
    },
    SdkProducer {
        topic_id: String,
        properties: PropertySet,
    },
    SdkConsumer {
        topic_id: String,
        properties: PropertySet,
    },
}

/// In-memory connector for both deployment modes
#[derive(Debug, Default)]
pub struct InMemoryConnector {
    calls: Mutex<Vec<ConstructionCall>>,
    consumers: Mutex<Vec<Arc<InMemoryConsumer>>>,
    pending_failures: AtomicUsize,
    connect_delay: Option<Duration>,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every constructor call
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// Make the next `count` constructions fail with a connection error
    pub fn fail_next(&self, count: usize) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// All constructor calls so far, including failed ones
    pub fn calls(&self) -> Vec<ConstructionCall> {
        self.calls.lock().clone()
    }

    pub fn construction_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Consumers built so far, in construction order
    pub fn consumers(&self) -> Vec<Arc<InMemoryConsumer>> {
        self.consumers.lock().clone()
    }

    async fn record(&self, call: ConstructionCall) -> ConnectorResult<()> {
        self.calls.lock().push(call);

        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }

        let should_fail = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(ConnectorError::connection("injected connection failure"));
        }
        Ok(())
    }

    fn register_consumer(
        &self,
        target: &str,
        processor: Arc<dyn MessageProcessor>,
    ) -> ConsumerHandle {
        let consumer = Arc::new(InMemoryConsumer::new(target, processor));
        self.consumers.lock().push(consumer.clone());
        consumer
    }
}

#[async_trait]
impl ServiceModeConnector for InMemoryConnector {
    async fn connect_producer(&self, auth: &AuthDescriptor) -> ConnectorResult<SenderHandle> {
        self.record(ConstructionCall::ServiceProducer {
            broker_id: auth.broker_id.clone(),
            principal_id: auth.principal_id.clone(),
        })
        .await?;
        Ok(Arc::new(InMemorySender::new(&auth.broker_id)))
    }

    async fn connect_consumer(
        &self,
        auth: &AuthDescriptor,
        processor: Arc<dyn MessageProcessor>,
    ) -> ConnectorResult<ConsumerHandle> {
        self.record(ConstructionCall::ServiceConsumer {
            broker_id: auth.broker_id.clone(),
            consumer_id: None,
        })
        .await?;
        Ok(self.register_consumer(&auth.broker_id, processor))
    }

    async fn connect_consumer_with_id(
        &self,
        auth: &AuthDescriptor,
        processor: Arc<dyn MessageProcessor>,
        consumer_id: &str,
    ) -> ConnectorResult<ConsumerHandle> {
        self.record(ConstructionCall::ServiceConsumer {
            broker_id: auth.broker_id.clone(),
            consumer_id: Some(consumer_id.to_string()),
        })
        .await?;
        Ok(self.register_consumer(&auth.broker_id, processor))
    }
}

#[async_trait]
impl SdkModeConnector for InMemoryConnector {
    async fn connect_producer(
        &self,
        properties: PropertySet,
        topic_id: &str,
    ) -> ConnectorResult<SenderHandle> {
        self.record(ConstructionCall::SdkProducer {
            topic_id: topic_id.to_string(),
            properties,
        })
        .await?;
        Ok(Arc::new(InMemorySender::new(topic_id)))
    }

    async fn connect_consumer(
        &self,
        properties: PropertySet,
        topic_id: &str,
        processor: Arc<dyn MessageProcessor>,
    ) -> ConnectorResult<ConsumerHandle> {
        self.record(ConstructionCall::SdkConsumer {
            topic_id: topic_id.to_string(),
            properties,
        })
        .await?;
        Ok(self.register_consumer(topic_id, processor))
    }
}

/// Producer that keeps published messages in memory
#[derive(Debug)]
pub struct InMemorySender {
    client_id: String,
    target: String,
    sent: Mutex<Vec<(Option<String>, Vec<u8>)>>,
}

impl InMemorySender {
    fn new(target: &str) -> Self {
        Self {
            client_id: format!("mem-producer-{}", Uuid::new_v4()),
            target: target.to_string(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl MessageSender for InMemorySender {
    async fn send(&self, key: Option<&str>, payload: Vec<u8>) -> ConnectorResult<()> {
        debug!(client_id = %self.client_id, target = %self.target, bytes = payload.len(), "in-memory send");
        self.sent.lock().push((key.map(str::to_string), payload));
        Ok(())
    }

    fn client_id(&self) -> &str {
        &self.client_id
    }
}

/// Consumer that hands dispatched messages straight to its processor
pub struct InMemoryConsumer {
    client_id: String,
    topic: String,
    processor: Arc<dyn MessageProcessor>,
    running: AtomicBool,
    next_offset: AtomicI64,
}

impl std::fmt::Debug for InMemoryConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryConsumer")
            .field("client_id", &self.client_id)
            .field("topic", &self.topic)
            .field("running", &self.running.load(Ordering::SeqCst))
            .finish()
    }
}

impl InMemoryConsumer {
    fn new(topic: &str, processor: Arc<dyn MessageProcessor>) -> Self {
        Self {
            client_id: format!("mem-consumer-{}", Uuid::new_v4()),
            topic: topic.to_string(),
            processor,
            running: AtomicBool::new(false),
            next_offset: AtomicI64::new(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Deliver one message to the processor. Fails when the consumer is stopped.
    pub async fn dispatch(&self, key: Option<&str>, payload: Vec<u8>) -> ConnectorResult<i64> {
        if !self.is_running() {
            return Err(ConnectorError::closed(&self.client_id));
        }
        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        let message = ConsumedMessage {
            topic: self.topic.clone(),
            partition: 0,
            offset,
            key: key.map(str::to_string),
            payload,
            received_at: Utc::now(),
        };
        self.processor.process(&message).await?;
        Ok(offset)
    }

    /// Deliver several payloads concurrently; offsets follow input order
    pub async fn dispatch_batch(&self, payloads: Vec<Vec<u8>>) -> ConnectorResult<Vec<i64>> {
        let deliveries = payloads
            .into_iter()
            .map(|payload| self.dispatch(None, payload));
        futures::future::try_join_all(deliveries).await
    }
}

#[async_trait]
impl MessageConsumer for InMemoryConsumer {
    async fn start(&self) -> ConnectorResult<()> {
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> ConnectorResult<()> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn client_id(&self) -> &str {
        &self.client_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingProcessor {
        seen: AtomicUsize,
    }

    #[async_trait]
    impl MessageProcessor for CountingProcessor {
        async fn process(&self, _message: &ConsumedMessage) -> ConnectorResult<()> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn auth() -> AuthDescriptor {
        AuthDescriptor::new("http://auth", "pid", "pwd", "MDS001")
    }

    #[tokio::test]
    async fn test_fail_next_consumes_failures() {
        let connector = InMemoryConnector::new();
        connector.fail_next(1);

        let first = ServiceModeConnector::connect_producer(&connector, &auth()).await;
        assert!(matches!(first, Err(ConnectorError::Connection { .. })));

        let second = ServiceModeConnector::connect_producer(&connector, &auth()).await;
        assert!(second.is_ok());
        assert_eq!(connector.construction_count(), 2);
    }

    #[tokio::test]
    async fn test_service_consumer_overloads_are_recorded() {
        let connector = InMemoryConnector::new();
        let processor: Arc<dyn MessageProcessor> = Arc::new(CountingProcessor::default());

        ServiceModeConnector::connect_consumer(&connector, &auth(), processor.clone())
            .await
            .unwrap();
        connector
            .connect_consumer_with_id(&auth(), processor, "c1")
            .await
            .unwrap();

        assert_eq!(
            connector.calls(),
            vec![
                ConstructionCall::ServiceConsumer {
                    broker_id: "MDS001".to_string(),
                    consumer_id: None,
                },
                ConstructionCall::ServiceConsumer {
                    broker_id: "MDS001".to_string(),
                    consumer_id: Some("c1".to_string()),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_consumer_dispatch_requires_start() {
        let connector = InMemoryConnector::new();
        let processor = Arc::new(CountingProcessor::default());

        let handle = SdkModeConnector::connect_consumer(
            &connector,
            PropertySet::new(),
            "T_ORDERS",
            processor.clone(),
        )
        .await
        .unwrap();
        let consumer = connector.consumers().pop().unwrap();

        assert!(consumer.dispatch(None, b"early".to_vec()).await.is_err());

        handle.start().await.unwrap();
        let offsets = consumer
            .dispatch_batch(vec![b"a".to_vec(), b"b".to_vec()])
            .await
            .unwrap();
        assert_eq!(offsets.len(), 2);
        assert_eq!(processor.seen.load(Ordering::SeqCst), 2);

        handle.stop().await.unwrap();
        assert!(!consumer.is_running());
    }

    #[tokio::test]
    async fn test_sender_records_messages() {
        let connector = InMemoryConnector::new();
        let sender = SdkModeConnector::connect_producer(&connector, PropertySet::new(), "T1")
            .await
            .unwrap();

        sender.send(Some("k"), b"hello".to_vec()).await.unwrap();
        assert!(sender.client_id().starts_with("mem-producer-"));
    }
}
