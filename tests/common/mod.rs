#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use mds_client::config::{MdsSettings, NamespaceSettings, PaasAuthInfo, PaasConfigResolver};
use mds_client::messaging::{
    ClientFactory, ConnectorResult, ConsumedMessage, InMemoryConnector, MessageProcessor,
};

pub const PRINCIPAL_ID: &str = "pid-001";
pub const APP_NAME: &str = "order-app";

/// Two namespaces: `ns1` with an explicit consumer base path, `ns2` without
pub fn test_settings(mode: Option<&str>) -> MdsSettings {
    let mut settings = MdsSettings {
        paas: PaasAuthInfo {
            mode: mode.map(str::to_string),
            principal_id: PRINCIPAL_ID.to_string(),
            auth_url: "http://uac.example.com/auth".to_string(),
            app_name: APP_NAME.to_string(),
        },
        ..Default::default()
    };

    settings.namespaces.insert(
        "ns1".to_string(),
        NamespaceSettings {
            broker_id: "MDS001".to_string(),
            topic: Some("T_NS1".to_string()),
            consumer_base_path: Some("/mds/ns1".to_string()),
            ..Default::default()
        },
    );
    settings.namespaces.insert(
        "ns2".to_string(),
        NamespaceSettings {
            broker_id: "MDS002".to_string(),
            topic: Some("T_NS2".to_string()),
            ..Default::default()
        },
    );
    settings
        .credentials
        .insert("MDS001".to_string(), "pwd-1".to_string());
    settings
        .credentials
        .insert("MDS002".to_string(), "pwd-2".to_string());
    settings
}

pub struct TestHarness {
    pub factory: ClientFactory,
    pub resolver: Arc<PaasConfigResolver>,
    pub connector: Arc<InMemoryConnector>,
}

impl TestHarness {
    pub fn new(mode: Option<&str>) -> Self {
        Self::with_connector(mode, InMemoryConnector::new())
    }

    pub fn with_connector(mode: Option<&str>, connector: InMemoryConnector) -> Self {
        let resolver = Arc::new(PaasConfigResolver::new(test_settings(mode)));
        let connector = Arc::new(connector);
        let factory = ClientFactory::new(resolver.clone(), connector.clone(), connector.clone());
        Self {
            factory,
            resolver,
            connector,
        }
    }

    pub fn set_mode(&self, mode: Option<&str>) {
        self.resolver
            .update(|settings| settings.paas.mode = mode.map(str::to_string));
    }
}

#[derive(Default)]
pub struct CountingProcessor {
    pub processed: AtomicUsize,
}

impl CountingProcessor {
    pub fn count(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageProcessor for CountingProcessor {
    async fn process(&self, _message: &ConsumedMessage) -> ConnectorResult<()> {
        self.processed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn processor() -> Arc<dyn MessageProcessor> {
    Arc::new(CountingProcessor::default())
}
