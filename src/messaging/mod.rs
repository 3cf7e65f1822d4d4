//! # Messaging Module
//!
//! Mode-aware producer/consumer acquisition for the message data service.
//!
//! ## Module Structure
//!
//! - `client_factory` - `ClientFactory`, the get-or-create entry point
//! - `client_cache` - per-mode, per-role handle caches
//! - `cache_key` - cache key and consumer identity derivation
//! - `mode` - deployment mode selection
//! - `properties` - sdk-mode property sets and derived consumer paths
//! - `auth` - service-mode auth descriptor
//! - `clients` - connector and handle capabilities, in-memory implementation
//! - `errors` - connector error types

pub mod auth;
pub mod cache_key;
pub mod client_cache;
pub mod client_factory;
pub mod clients;
pub mod errors;
pub mod mode;
pub mod properties;

pub use auth::AuthDescriptor;
pub use cache_key::{CacheKey, ConsumerIdentity, DEFAULT_CONSUMER_ID, KEY_SEPARATOR};
pub use client_cache::{ClientCache, ClientCacheStats, ClientCaches};
pub use client_factory::ClientFactory;
pub use clients::{
    ConstructionCall, ConsumedMessage, ConsumerHandle, InMemoryConnector, InMemoryConsumer,
    InMemorySender, MessageConsumer, MessageProcessor, MessageSender, SdkModeConnector,
    SenderHandle, ServiceModeConnector,
};
pub use errors::{ConnectorError, ConnectorResult};
pub use mode::{resolve_mode, DeploymentMode};
pub use properties::PropertySet;
