//! Integration tests for client resolution, caching and mode dispatch

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{processor, CountingProcessor, TestHarness, APP_NAME, PRINCIPAL_ID};
use mds_client::messaging::properties::{
    KAFKA_CONSUMER_ID, MDS_CONSUMER_BASE_PATH, MDS_PARTITION_OFFSET_BASEPATH,
    MDS_PARTITION_PAUSELOCK_PATH, MDS_PARTITION_RUNNINGLOCK_PATH, MDS_TOPIC,
};
use mds_client::messaging::{
    CacheKey, ConstructionCall, ConsumerIdentity, DeploymentMode, InMemoryConnector,
    MessageConsumer, PropertySet,
};
use mds_client::ClientFactoryError;

fn sdk_consumer_properties(call: &ConstructionCall) -> &PropertySet {
    match call {
        ConstructionCall::SdkConsumer { properties, .. } => properties,
        other => panic!("expected sdk consumer construction, got {other:?}"),
    }
}

#[tokio::test]
async fn test_service_mode_sender_is_cached() {
    let harness = TestHarness::new(None);

    let first = harness.factory.get_sender("ns1").await.unwrap();
    let second = harness.factory.get_sender("ns1").await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(
        harness.connector.calls(),
        vec![ConstructionCall::ServiceProducer {
            broker_id: "MDS001".to_string(),
            principal_id: PRINCIPAL_ID.to_string(),
        }]
    );
    assert_eq!(
        harness.factory.cache_stats().service_senders,
        vec![CacheKey::producer(PRINCIPAL_ID, "MDS001")]
    );
}

#[tokio::test]
async fn test_sdk_mode_sender_is_cached_by_app_name() {
    let harness = TestHarness::new(Some("sdk"));

    let first = harness.factory.get_sender("ns1").await.unwrap();
    let second = harness.factory.get_sender("ns1").await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let calls = harness.connector.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        ConstructionCall::SdkProducer {
            topic_id,
            properties,
        } => {
            assert_eq!(topic_id, "T_NS1");
            assert_eq!(properties.get(MDS_TOPIC), Some("T_NS1"));
        }
        other => panic!("unexpected construction {other:?}"),
    }

    let stats = harness.factory.cache_stats();
    assert_eq!(stats.sdk_senders, vec![CacheKey::producer(APP_NAME, "MDS001")]);
    assert!(stats.service_senders.is_empty());
}

#[tokio::test]
async fn test_different_namespaces_get_different_senders() {
    let harness = TestHarness::new(None);

    let ns1 = harness.factory.get_sender("ns1").await.unwrap();
    let ns2 = harness.factory.get_sender("ns2").await.unwrap();

    assert!(!Arc::ptr_eq(&ns1, &ns2));
    assert_eq!(harness.connector.construction_count(), 2);
}

#[tokio::test]
async fn test_mode_switch_routes_to_separate_cache() {
    let harness = TestHarness::new(Some("service"));
    let service_sender = harness.factory.get_sender("ns1").await.unwrap();

    harness.set_mode(Some("sdk"));
    assert_eq!(
        harness.factory.current_mode().await.unwrap(),
        DeploymentMode::Sdk
    );
    let sdk_sender = harness.factory.get_sender("ns1").await.unwrap();
    assert!(!Arc::ptr_eq(&service_sender, &sdk_sender));

    // Blank flag means service mode again, and the old entry is reused
    harness.set_mode(Some(" "));
    let service_again = harness.factory.get_sender("ns1").await.unwrap();
    assert!(Arc::ptr_eq(&service_sender, &service_again));

    assert_eq!(harness.connector.construction_count(), 2);
    let stats = harness.factory.cache_stats();
    assert_eq!(stats.service_senders.len(), 1);
    assert_eq!(stats.sdk_senders.len(), 1);
}

#[tokio::test]
async fn test_blank_namespace_fails_before_construction() {
    for mode in [None, Some("sdk")] {
        let harness = TestHarness::new(mode);

        let sender_err = harness.factory.get_sender("").await.unwrap_err();
        assert!(matches!(sender_err, ClientFactoryError::Configuration { .. }));

        let consumer_err = harness
            .factory
            .get_consumer("   ", processor(), Some("c1"))
            .await
            .unwrap_err();
        assert!(matches!(consumer_err, ClientFactoryError::Configuration { .. }));

        assert_eq!(harness.connector.construction_count(), 0);
        assert_eq!(harness.factory.cache_stats().total(), 0);
    }
}

#[tokio::test]
async fn test_unknown_namespace_is_configuration_error() {
    let harness = TestHarness::new(Some("sdk"));

    let err = harness.factory.get_sender("nope").await.unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(harness.connector.construction_count(), 0);
}

#[tokio::test]
async fn test_service_consumer_default_identity_uses_no_id_constructor() {
    let harness = TestHarness::new(None);

    let default_consumer = harness
        .factory
        .get_consumer("ns1", processor(), None)
        .await
        .unwrap();

    assert_eq!(
        harness.connector.calls(),
        vec![ConstructionCall::ServiceConsumer {
            broker_id: "MDS001".to_string(),
            consumer_id: None,
        }]
    );
    assert_eq!(
        harness.factory.cache_stats().service_consumers,
        vec![CacheKey::consumer(
            PRINCIPAL_ID,
            "MDS001",
            &ConsumerIdentity::Default
        )]
    );
    assert_eq!(
        harness.factory.cache_stats().service_consumers[0].as_str(),
        "pid-001.MDS001.consumer"
    );

    // Blank id is the same identity, and hits the cache
    let blank = harness
        .factory
        .get_consumer("ns1", processor(), Some(""))
        .await
        .unwrap();
    assert!(Arc::ptr_eq(&default_consumer, &blank));
    assert_eq!(harness.connector.construction_count(), 1);
}

#[tokio::test]
async fn test_service_consumer_explicit_id_uses_id_constructor() {
    let harness = TestHarness::new(None);

    harness
        .factory
        .get_consumer("ns1", processor(), Some("billing"))
        .await
        .unwrap();

    assert_eq!(
        harness.connector.calls(),
        vec![ConstructionCall::ServiceConsumer {
            broker_id: "MDS001".to_string(),
            consumer_id: Some("billing".to_string()),
        }]
    );
    assert_eq!(
        harness.factory.cache_stats().service_consumers[0].as_str(),
        "pid-001.MDS001.billing"
    );
}

#[tokio::test]
async fn test_sdk_consumer_default_identity() {
    let harness = TestHarness::new(Some("sdk"));

    harness
        .factory
        .get_consumer("ns1", processor(), None)
        .await
        .unwrap();

    let calls = harness.connector.calls();
    let properties = sdk_consumer_properties(&calls[0]);
    assert_eq!(properties.get(KAFKA_CONSUMER_ID), Some("consumer"));
    assert_eq!(
        properties.get(MDS_PARTITION_RUNNINGLOCK_PATH),
        Some("/mds/ns1/consumer/partitions/running")
    );
    assert_eq!(
        harness.factory.cache_stats().sdk_consumers[0].as_str(),
        "order-app.MDS001.consumer"
    );
}

#[tokio::test]
async fn test_sdk_consumer_derived_paths() {
    let harness = TestHarness::new(Some("sdk"));

    harness
        .factory
        .get_consumer("ns1", processor(), Some("c1"))
        .await
        .unwrap();

    let calls = harness.connector.calls();
    assert_eq!(calls.len(), 1);
    let ConstructionCall::SdkConsumer { topic_id, .. } = &calls[0] else {
        panic!("expected sdk consumer construction");
    };
    assert_eq!(topic_id, "T_NS1");

    let properties = sdk_consumer_properties(&calls[0]);
    assert_eq!(properties.get(KAFKA_CONSUMER_ID), Some("c1"));
    assert_eq!(properties.get(MDS_CONSUMER_BASE_PATH), Some("/mds/ns1"));
    assert_eq!(
        properties.get(MDS_PARTITION_RUNNINGLOCK_PATH),
        Some("/mds/ns1/c1/partitions/running")
    );
    assert_eq!(
        properties.get(MDS_PARTITION_PAUSELOCK_PATH),
        Some("/mds/ns1/c1/partitions/pause")
    );
    assert_eq!(
        properties.get(MDS_PARTITION_OFFSET_BASEPATH),
        Some("/mds/ns1/c1/offsets")
    );
}

#[tokio::test]
async fn test_sdk_consumer_default_base_path() {
    let harness = TestHarness::new(Some("sdk"));

    harness
        .factory
        .get_consumer("ns2", processor(), Some("c7"))
        .await
        .unwrap();

    let calls = harness.connector.calls();
    let properties = sdk_consumer_properties(&calls[0]);
    assert_eq!(
        properties.get(MDS_PARTITION_OFFSET_BASEPATH),
        Some("/mds/ns2/c7/offsets")
    );
}

#[tokio::test]
async fn test_distinct_consumer_ids_get_distinct_handles() {
    for mode in [None, Some("sdk")] {
        let harness = TestHarness::new(mode);

        let c1 = harness
            .factory
            .get_consumer("ns1", processor(), Some("c1"))
            .await
            .unwrap();
        let c2 = harness
            .factory
            .get_consumer("ns1", processor(), Some("c2"))
            .await
            .unwrap();
        let c1_again = harness
            .factory
            .get_consumer("ns1", processor(), Some("c1"))
            .await
            .unwrap();

        assert!(!Arc::ptr_eq(&c1, &c2));
        assert!(Arc::ptr_eq(&c1, &c1_again));
        assert_eq!(harness.connector.construction_count(), 2);
        assert_eq!(harness.factory.cache_stats().total(), 2);
    }
}

#[tokio::test]
async fn test_sender_failure_is_wrapped_and_not_cached() {
    let harness = TestHarness::new(None);
    harness.connector.fail_next(1);

    let err = harness.factory.get_sender("ns1").await.unwrap_err();
    assert!(matches!(err, ClientFactoryError::ClientAcquisition { .. }));
    assert_eq!(err.broker_id(), Some("MDS001"));
    assert!(harness.factory.cache_stats().service_senders.is_empty());

    // Next call constructs from scratch
    let sender = harness.factory.get_sender("ns1").await.unwrap();
    assert_eq!(harness.connector.construction_count(), 2);
    assert!(Arc::ptr_eq(
        &sender,
        &harness.factory.get_sender("ns1").await.unwrap()
    ));
}

#[tokio::test]
async fn test_service_consumer_failure_is_wrapped_and_not_cached() {
    let harness = TestHarness::new(None);
    harness.connector.fail_next(1);

    let err = harness
        .factory
        .get_consumer("ns1", processor(), Some("c1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientFactoryError::ClientAcquisition { .. }));
    assert_eq!(err.broker_id(), Some("MDS001"));
    assert!(harness.factory.cache_stats().service_consumers.is_empty());

    let consumer = harness
        .factory
        .get_consumer("ns1", processor(), Some("c1"))
        .await
        .unwrap();
    assert_eq!(harness.connector.construction_count(), 2);
    assert_eq!(
        harness.factory.cache_stats().service_consumers,
        vec![CacheKey::consumer(
            PRINCIPAL_ID,
            "MDS001",
            &ConsumerIdentity::from_option(Some("c1"))
        )]
    );
    assert!(Arc::ptr_eq(
        &consumer,
        &harness
            .factory
            .get_consumer("ns1", processor(), Some("c1"))
            .await
            .unwrap()
    ));
}

#[tokio::test]
async fn test_sdk_consumer_failure_is_wrapped_and_not_cached() {
    let harness = TestHarness::new(Some("sdk"));
    harness.connector.fail_next(1);

    let err = harness
        .factory
        .get_consumer("ns2", processor(), Some("c1"))
        .await
        .unwrap_err();
    assert_eq!(err.broker_id(), Some("MDS002"));
    assert!(harness.factory.cache_stats().sdk_consumers.is_empty());

    harness
        .factory
        .get_consumer("ns2", processor(), Some("c1"))
        .await
        .unwrap();
    assert_eq!(harness.connector.construction_count(), 2);
    assert_eq!(harness.factory.cache_stats().sdk_consumers.len(), 1);
}

#[tokio::test]
async fn test_missing_credential_is_configuration_error() {
    let harness = TestHarness::new(None);
    harness.resolver.update(|settings| settings.credentials.clear());

    let err = harness.factory.get_sender("ns1").await.unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(harness.connector.construction_count(), 0);
    assert_eq!(harness.factory.cache_stats().total(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_construct_once() {
    let harness = Arc::new(TestHarness::with_connector(
        Some("sdk"),
        InMemoryConnector::new().with_connect_delay(Duration::from_millis(25)),
    ));

    let tasks: Vec<_> = (0..12)
        .map(|_| {
            let harness = harness.clone();
            tokio::spawn(async move { harness.factory.get_sender("ns1").await.unwrap() })
        })
        .collect();

    let senders: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    for sender in &senders[1..] {
        assert!(Arc::ptr_eq(&senders[0], sender));
    }
    assert_eq!(harness.connector.construction_count(), 1);
}

#[tokio::test]
async fn test_consumer_handle_delivers_to_processor() {
    let harness = TestHarness::new(Some("sdk"));
    let counting = Arc::new(CountingProcessor::default());

    let handle = harness
        .factory
        .get_consumer("ns1", counting.clone(), Some("c1"))
        .await
        .unwrap();
    handle.start().await.unwrap();

    let consumer = harness.connector.consumers().pop().unwrap();
    assert_eq!(consumer.client_id(), handle.client_id());
    consumer.dispatch(Some("k1"), b"payload".to_vec()).await.unwrap();

    assert_eq!(counting.count(), 1);
}
