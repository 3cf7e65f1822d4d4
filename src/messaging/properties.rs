//! # Sdk-Mode Property Sets
//!
//! Broker client properties assembled per namespace. Consumer sets get
//! per-consumer partition lock and offset paths injected before construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ClientFactoryError, ClientFactoryResult};

/// Topic id the client reads from or writes to
pub const MDS_TOPIC: &str = "mds.topic";
/// Namespace-level base path for consumer coordination data
pub const MDS_CONSUMER_BASE_PATH: &str = "mds.consumer.base.path";
/// Lock path for partitions currently being consumed
pub const MDS_PARTITION_RUNNINGLOCK_PATH: &str = "mds.partition.runninglock.path";
/// Lock path for paused partitions
pub const MDS_PARTITION_PAUSELOCK_PATH: &str = "mds.partition.pauselock.path";
/// Base path for committed offsets
pub const MDS_PARTITION_OFFSET_BASEPATH: &str = "mds.partition.offset.basepath";
/// Consumer group id
pub const KAFKA_CONSUMER_ID: &str = "kafka.consumer.id";

const RUNNING_SUFFIX: &str = "/partitions/running";
const PAUSE_SUFFIX: &str = "/partitions/pause";
const OFFSETS_SUFFIX: &str = "/offsets";

/// String-keyed client properties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySet(BTreeMap<String, String>);

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries of `other` overwrite entries of `self`
    pub fn merge(&mut self, other: &PropertySet) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    /// Read a property that must be present and non-blank
    pub fn require(&self, key: &str) -> ClientFactoryResult<&str> {
        match self.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ClientFactoryError::configuration(
                "PropertySet",
                format!("required property '{key}' is missing"),
            )),
        }
    }

    pub fn topic_id(&self) -> ClientFactoryResult<&str> {
        self.require(MDS_TOPIC)
    }

    /// Point the set at one consumer's group id and coordination paths.
    ///
    /// Each path is `{base}/{consumer_id}{suffix}` where `base` is the
    /// namespace's configured consumer base path.
    pub fn inject_consumer_paths(&mut self, consumer_id: &str) -> ClientFactoryResult<()> {
        let consumer_base = format!("{}/{consumer_id}", self.require(MDS_CONSUMER_BASE_PATH)?);

        self.insert(KAFKA_CONSUMER_ID, consumer_id);
        self.insert(
            MDS_PARTITION_RUNNINGLOCK_PATH,
            format!("{consumer_base}{RUNNING_SUFFIX}"),
        );
        self.insert(
            MDS_PARTITION_PAUSELOCK_PATH,
            format!("{consumer_base}{PAUSE_SUFFIX}"),
        );
        self.insert(
            MDS_PARTITION_OFFSET_BASEPATH,
            format!("{consumer_base}{OFFSETS_SUFFIX}"),
        );
        Ok(())
    }
}

impl FromIterator<(String, String)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, String>> for PropertySet {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}
