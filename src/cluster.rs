//! Control-plane access
//!
//! The reconcilers only see the traits in this module. Production code uses
//! [`KubeConnector`] and [`KubeClusterClient`]; tests inject in-memory fakes or
//! mocks through the same seams.

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::api::PostParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::{Error, Result};

/// Default connection timeout for kube clients
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default read timeout for kube clients
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// How to reach the cluster: a kubeconfig file and optionally a context in it
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterAccess {
    pub kubeconfig: PathBuf,
    pub context: Option<String>,
}

impl ClusterAccess {
    pub fn new(kubeconfig: impl Into<PathBuf>) -> Self {
        Self {
            kubeconfig: kubeconfig.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Namespaced, statically typed resources the resource client can round-trip
pub trait ManagedResource:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<K> ManagedResource for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// Read-only view of API discovery
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DiscoveryClient: Send + Sync {
    /// Succeeds once the API server serves `group_version` (e.g. `fluxcd.controlplane.io/v1`)
    async fn server_resources_for_group_version(
        &self,
        group_version: &str,
    ) -> std::result::Result<(), kube::Error>;
}

/// Create, get and replace for namespaced resources
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn create<K: ManagedResource>(&self, obj: &K) -> std::result::Result<K, kube::Error>;

    async fn get<K: ManagedResource>(
        &self,
        namespace: &str,
        name: &str,
    ) -> std::result::Result<K, kube::Error>;

    /// Full update; the object's `resourceVersion` is sent as read
    async fn replace<K: ManagedResource>(&self, obj: &K) -> std::result::Result<K, kube::Error>;
}

/// Builds the clients for one invocation from a [`ClusterAccess`]
#[async_trait]
pub trait ClusterConnector: Send + Sync {
    type Client: DiscoveryClient + ResourceClient;

    async fn connect(&self, access: &ClusterAccess) -> Result<Self::Client>;
}

/// Kubernetes-backed discovery and resource client
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    /// Create a new KubeClusterClient wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K: ManagedResource>(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl DiscoveryClient for KubeClusterClient {
    async fn server_resources_for_group_version(
        &self,
        group_version: &str,
    ) -> std::result::Result<(), kube::Error> {
        if group_version == "v1" {
            self.client.list_core_api_resources("v1").await?;
        } else {
            self.client.list_api_group_resources(group_version).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceClient for KubeClusterClient {
    async fn create<K: ManagedResource>(&self, obj: &K) -> std::result::Result<K, kube::Error> {
        let namespace = obj.namespace().unwrap_or_default();
        self.api::<K>(&namespace)
            .create(&PostParams::default(), obj)
            .await
    }

    async fn get<K: ManagedResource>(
        &self,
        namespace: &str,
        name: &str,
    ) -> std::result::Result<K, kube::Error> {
        self.api::<K>(namespace).get(name).await
    }

    async fn replace<K: ManagedResource>(&self, obj: &K) -> std::result::Result<K, kube::Error> {
        let namespace = obj.namespace().unwrap_or_default();
        self.api::<K>(&namespace)
            .replace(&obj.name_any(), &PostParams::default(), obj)
            .await
    }
}

/// Connector that reads a kubeconfig file and builds a [`KubeClusterClient`]
#[derive(Clone, Debug)]
pub struct KubeConnector {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for KubeConnector {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

#[async_trait]
impl ClusterConnector for KubeConnector {
    type Client = KubeClusterClient;

    async fn connect(&self, access: &ClusterAccess) -> Result<KubeClusterClient> {
        let kubeconfig = Kubeconfig::read_from(&access.kubeconfig).map_err(|e| {
            Error::Connectivity(format!(
                "failed to read kubeconfig {}: {}",
                access.kubeconfig.display(),
                e
            ))
        })?;

        let options = KubeConfigOptions {
            context: access.context.clone(),
            ..Default::default()
        };

        let mut config = Config::from_custom_kubeconfig(kubeconfig, &options)
            .await
            .map_err(|e| Error::Connectivity(format!("failed to load kubeconfig: {}", e)))?;
        config.connect_timeout = Some(self.connect_timeout);
        config.read_timeout = Some(self.read_timeout);

        debug!(cluster_url = %config.cluster_url, "Building Kubernetes client");

        let client = Client::try_from(config)
            .map_err(|e| Error::Connectivity(format!("failed to create client: {}", e)))?;

        Ok(KubeClusterClient::new(client))
    }
}
