//! # Message Client Capabilities
//!
//! Mode-specific connector traits, the handle traits they return, and an
//! in-memory implementation of both connectors.

pub mod in_memory;
mod traits;

pub use in_memory::{ConstructionCall, InMemoryConnector, InMemoryConsumer, InMemorySender};
pub use traits::{
    ConsumedMessage, ConsumerHandle, MessageConsumer, MessageProcessor, MessageSender,
    SdkModeConnector, SenderHandle, ServiceModeConnector,
};
