//! Configuration Loader
//!
//! Layered settings loading (file, environment file, environment variables)
//! and the file-backed [`ConfigResolver`] built on top of it.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{detect_environment, ConfigResolver, DataSourceConfig, PaasAuthInfo};
use crate::error::{ClientFactoryError, ClientFactoryResult};
use crate::messaging::properties::{PropertySet, MDS_CONSUMER_BASE_PATH, MDS_TOPIC};

/// Default prefix for environment variable overrides
pub const DEFAULT_ENV_PREFIX: &str = "MDS";

/// Root of the settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MdsSettings {
    #[serde(default)]
    pub paas: PaasAuthInfo,
    /// Message namespaces by name
    #[serde(default)]
    pub namespaces: HashMap<String, NamespaceSettings>,
    /// Service-mode credentials by broker id
    #[serde(default)]
    pub credentials: HashMap<String, String>,
    #[serde(default)]
    pub datasources: HashMap<String, DataSourceConfig>,
}

/// One message namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSettings {
    pub broker_id: String,
    #[serde(default)]
    pub topic: Option<String>,
    /// Defaults to `/mds/{namespace}`
    #[serde(default)]
    pub consumer_base_path: Option<String>,
    /// Shared by producer and consumer
    #[serde(default)]
    pub properties: PropertySet,
    #[serde(default)]
    pub producer: PropertySet,
    #[serde(default)]
    pub consumer: PropertySet,
}

/// Where and how settings are loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub path: PathBuf,
    /// Selects the `{stem}.{environment}.{ext}` overlay file
    pub environment: String,
    pub env_prefix: String,
}

impl LoadOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            environment: detect_environment(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// `config/mds.toml` + `production` → `config/mds.production.toml`
    pub fn environment_file(&self) -> Option<PathBuf> {
        let stem = self.path.file_stem()?.to_str()?;
        let file_name = match self.path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{stem}.{}.{ext}", self.environment),
            None => format!("{stem}.{}", self.environment),
        };
        Some(self.path.with_file_name(file_name))
    }
}

impl MdsSettings {
    /// Load with the default environment and `MDS__` variable prefix
    pub fn load(path: impl AsRef<Path>) -> ClientFactoryResult<Self> {
        Self::load_with(&LoadOptions::new(path.as_ref()))
    }

    pub fn load_with(options: &LoadOptions) -> ClientFactoryResult<Self> {
        debug!(
            path = %options.path.display(),
            environment = %options.environment,
            "Loading MDS settings"
        );

        let mut builder =
            config::Config::builder().add_source(config::File::from(options.path.as_path()));
        if let Some(env_file) = options.environment_file() {
            builder = builder.add_source(config::File::from(env_file).required(false));
        }
        let settings: MdsSettings = builder
            .add_source(
                config::Environment::with_prefix(&options.env_prefix)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        info!(
            environment = %options.environment,
            namespaces = settings.namespaces.len(),
            datasources = settings.datasources.len(),
            "MDS settings loaded"
        );
        Ok(settings)
    }

    fn namespace(&self, namespace: &str) -> ClientFactoryResult<&NamespaceSettings> {
        lookup(&self.namespaces, namespace).ok_or_else(|| {
            ClientFactoryError::configuration(
                "PaasConfigResolver",
                format!("no message namespace configured for '{namespace}'"),
            )
        })
    }
}

/// Shared properties, then role overrides, then the namespace topic
fn assemble_properties(
    namespace: &str,
    ns: &NamespaceSettings,
    role: &PropertySet,
) -> PropertySet {
    let mut props = ns.properties.clone();
    props.merge(role);
    if let Some(topic) = &ns.topic {
        props.insert(MDS_TOPIC, topic.as_str());
    }
    debug!(namespace = %namespace, properties = props.len(), "Assembled property set");
    props
}

// Some sources lower-case map keys; fall back to a case-insensitive match
fn lookup<'a, V>(map: &'a HashMap<String, V>, key: &str) -> Option<&'a V> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    })
}

/// File-backed resolver whose settings can be reloaded or edited at runtime
#[derive(Debug)]
pub struct PaasConfigResolver {
    settings: RwLock<MdsSettings>,
    options: Option<LoadOptions>,
}

impl PaasConfigResolver {
    /// Resolver over in-memory settings; `reload` is a no-op
    pub fn new(settings: MdsSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            options: None,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> ClientFactoryResult<Self> {
        Self::from_options(LoadOptions::new(path.as_ref()))
    }

    pub fn from_options(options: LoadOptions) -> ClientFactoryResult<Self> {
        let settings = MdsSettings::load_with(&options)?;
        Ok(Self {
            settings: RwLock::new(settings),
            options: Some(options),
        })
    }

    /// Re-read all sources; on failure the previous settings stay in place
    pub fn reload(&self) -> ClientFactoryResult<()> {
        if let Some(options) = &self.options {
            let fresh = MdsSettings::load_with(options)?;
            *self.settings.write() = fresh;
        }
        Ok(())
    }

    /// Edit settings in place
    pub fn update<F>(&self, edit: F)
    where
        F: FnOnce(&mut MdsSettings),
    {
        edit(&mut self.settings.write());
    }

    pub fn snapshot(&self) -> MdsSettings {
        self.settings.read().clone()
    }
}

#[async_trait]
impl ConfigResolver for PaasConfigResolver {
    async fn auth_info(&self) -> ClientFactoryResult<PaasAuthInfo> {
        Ok(self.settings.read().paas.clone())
    }

    async fn resolve_broker_id(&self, namespace: &str) -> ClientFactoryResult<String> {
        let settings = self.settings.read();
        let ns = settings.namespace(namespace)?;
        if ns.broker_id.trim().is_empty() {
            return Err(ClientFactoryError::configuration(
                "PaasConfigResolver",
                format!("namespace '{namespace}' has no broker id"),
            ));
        }
        Ok(ns.broker_id.clone())
    }

    async fn resolve_credential(&self, broker_id: &str) -> ClientFactoryResult<String> {
        lookup(&self.settings.read().credentials, broker_id)
            .cloned()
            .ok_or_else(|| {
                ClientFactoryError::configuration(
                    "PaasConfigResolver",
                    format!("no credential configured for message service '{broker_id}'"),
                )
            })
    }

    async fn assemble_producer_properties(
        &self,
        namespace: &str,
    ) -> ClientFactoryResult<PropertySet> {
        let settings = self.settings.read();
        let ns = settings.namespace(namespace)?;
        Ok(assemble_properties(namespace, ns, &ns.producer))
    }

    async fn assemble_consumer_properties(
        &self,
        namespace: &str,
    ) -> ClientFactoryResult<PropertySet> {
        let settings = self.settings.read();
        let ns = settings.namespace(namespace)?;
        let mut props = assemble_properties(namespace, ns, &ns.consumer);

        if let Some(base_path) = &ns.consumer_base_path {
            props.insert(MDS_CONSUMER_BASE_PATH, base_path.as_str());
        } else if !props.contains_key(MDS_CONSUMER_BASE_PATH) {
            props.insert(MDS_CONSUMER_BASE_PATH, format!("/mds/{namespace}"));
        }
        Ok(props)
    }

    async fn datasource_config(&self, name: &str) -> ClientFactoryResult<DataSourceConfig> {
        lookup(&self.settings.read().datasources, name)
            .cloned()
            .ok_or_else(|| {
                ClientFactoryError::configuration(
                    "PaasConfigResolver",
                    format!("no datasource configured for '{name}'"),
                )
            })
    }
}
