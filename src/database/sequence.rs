//! Holder for the datasource backing the sequence generator.

use crate::config::ConfigResolver;
use crate::error::ClientFactoryResult;

use super::connection::PaasDataSource;

/// Datasource name used when none is given
pub const DEFAULT_SEQUENCE_DATASOURCE: &str = "sequence";

#[derive(Debug)]
pub struct SequenceDataSourceLoader {
    name: String,
    data_source: Option<PaasDataSource>,
}

impl Default for SequenceDataSourceLoader {
    fn default() -> Self {
        Self::new(DEFAULT_SEQUENCE_DATASOURCE)
    }
}

impl SequenceDataSourceLoader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_source: None,
        }
    }

    /// Open the configured datasource unless one is already set
    pub async fn init(&mut self, resolver: &dyn ConfigResolver) -> ClientFactoryResult<()> {
        if self.data_source.is_none() {
            self.data_source = Some(PaasDataSource::connect(resolver, &self.name).await?);
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_source(&self) -> Option<&PaasDataSource> {
        self.data_source.as_ref()
    }

    pub fn set_data_source(&mut self, data_source: PaasDataSource) {
        self.data_source = Some(data_source);
    }
}
