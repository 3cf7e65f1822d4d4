//! # Database Datasources
//!
//! Pooled SQL datasources configured through the PaaS [`ConfigResolver`].
//!
//! - [`connection`] - named pool built from resolved settings
//! - [`sequence`] - holder for the sequence generator's datasource
//!
//! [`ConfigResolver`]: crate::config::ConfigResolver

pub mod connection;
pub mod sequence;

pub use connection::{pool_options, PaasDataSource};
pub use sequence::{SequenceDataSourceLoader, DEFAULT_SEQUENCE_DATASOURCE};
