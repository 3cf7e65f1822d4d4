#![allow(clippy::doc_markdown)] // Allow technical terms like PaaS, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # MDS Client Factory
//!
//! Mode-aware access to the message data service (MDS) and pooled SQL
//! datasources for PaaS applications.
//!
//! ## Overview
//!
//! Applications ask for a producer or consumer by logical **namespace**. The
//! factory reads the PaaS deployment mode on every request and builds the
//! client through one of two paths:
//!
//! - **service mode** - a central authenticated broker-access service, using
//!   an auth descriptor (auth URL, principal id, credential, broker id)
//! - **sdk mode** - a direct broker connection from locally assembled
//!   properties, with per-consumer partition lock and offset paths
//!
//! Exactly one client is kept per cache key for the lifetime of the factory;
//! callers share it.
//!
//! ## Module Organization
//!
//! - [`messaging`] - client factory, caches, mode selection, connectors
//! - [`config`] - PaaS settings, layered loading, the resolver capability
//! - [`database`] - pooled SQL datasources
//! - [`error`] - structured error handling
//! - [`logging`] - structured logging setup and helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mds_client::config::PaasConfigResolver;
//! use mds_client::messaging::{ClientFactory, InMemoryConnector};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! mds_client::logging::init_structured_logging();
//!
//! let resolver = Arc::new(PaasConfigResolver::from_file("config/mds.toml")?);
//! let connector = Arc::new(InMemoryConnector::new());
//! let factory = ClientFactory::new(resolver, connector.clone(), connector);
//!
//! let sender = factory.get_sender("orders").await?;
//! let again = factory.get_sender("orders").await?;
//! assert!(Arc::ptr_eq(&sender, &again));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod messaging;

pub use config::{ConfigResolver, PaasAuthInfo, PaasConfigResolver};
pub use database::{PaasDataSource, SequenceDataSourceLoader};
pub use error::{ClientFactoryError, ClientFactoryResult};
pub use messaging::{
    ClientFactory, ConsumerHandle, DeploymentMode, MessageProcessor, SenderHandle,
};
