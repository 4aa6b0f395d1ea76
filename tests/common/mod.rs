//! In-memory control plane used by the integration tests
//!
//! Stores objects as JSON keyed by kind/namespace/name, assigns
//! `resourceVersion`s, rejects duplicate creates with AlreadyExists and stale
//! replaces with Conflict, and records every call so tests can assert on
//! read/write counts.

#![allow(dead_code)]

use async_trait::async_trait;
use kube::core::ErrorResponse;
use kube::{Resource, ResourceExt};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use flux_bootstrap::cluster::{
    ClusterAccess, ClusterConnector, DiscoveryClient, ManagedResource, ResourceClient,
};
use flux_bootstrap::config::BootstrapOptions;
use flux_bootstrap::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Create,
    Get,
    Replace,
}

#[derive(Default)]
struct State {
    served: BTreeSet<String>,
    objects: BTreeMap<(String, String, String), serde_json::Value>,
    next_version: u64,
    calls: Vec<(Op, String)>,
    failures: Vec<(Op, String, u16, String)>,
    connect_error: Option<String>,
    connects: usize,
}

/// Shared handle to the fake control plane
#[derive(Clone, Default)]
pub struct FakeCluster {
    state: Arc<Mutex<State>>,
}

pub fn api_error(code: u16, reason: &str, message: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: reason.to_string(),
        code,
    })
}

fn key_of<K: ManagedResource>(obj: &K) -> (String, String, String) {
    (
        K::kind(&()).to_string(),
        obj.namespace().unwrap_or_default(),
        obj.name_any(),
    )
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cluster that already serves both Flux API groups
    pub fn with_flux_apis() -> Self {
        let cluster = Self::new();
        cluster.serve("fluxcd.controlplane.io/v1");
        cluster.serve("source.toolkit.fluxcd.io/v1");
        cluster
    }

    pub fn serve(&self, group_version: &str) {
        self.state
            .lock()
            .unwrap()
            .served
            .insert(group_version.to_string());
    }

    /// Store an object directly, bypassing call recording
    pub fn insert<K: ManagedResource>(&self, obj: &K) {
        let mut state = self.state.lock().unwrap();
        state.next_version += 1;
        let mut value = serde_json::to_value(obj).unwrap();
        value["metadata"]["resourceVersion"] = state.next_version.to_string().into();
        state.objects.insert(key_of(obj), value);
    }

    pub fn object<K: ManagedResource>(&self, namespace: &str, name: &str) -> Option<K> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(&(K::kind(&()).to_string(), namespace.to_string(), name.to_string()))
            .map(|v| serde_json::from_value(v.clone()).unwrap())
    }

    pub fn raw_object(&self, kind: &str, namespace: &str, name: &str) -> Option<serde_json::Value> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(&(kind.to_string(), namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn count_of_kind(&self, kind: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.objects.keys().filter(|(k, _, _)| k == kind).count()
    }

    pub fn calls(&self, op: Op, kind: &str) -> usize {
        let state = self.state.lock().unwrap();
        state
            .calls
            .iter()
            .filter(|(o, k)| *o == op && k == kind)
            .count()
    }

    pub fn total_calls(&self, kind: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.calls.iter().filter(|(_, k)| k == kind).count()
    }

    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    /// Make every `op` on `kind` fail with the given status
    pub fn fail(&self, op: Op, kind: &str, code: u16, reason: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((op, kind.to_string(), code, reason.to_string()));
    }

    pub fn fail_connect(&self, message: &str) {
        self.state.lock().unwrap().connect_error = Some(message.to_string());
    }

    fn record(&self, op: Op, kind: &str) -> std::result::Result<(), kube::Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((op, kind.to_string()));
        match state
            .failures
            .iter()
            .find(|(o, k, _, _)| *o == op && k == kind)
        {
            Some((_, _, code, reason)) => Err(api_error(*code, reason, "injected failure")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DiscoveryClient for FakeCluster {
    async fn server_resources_for_group_version(
        &self,
        group_version: &str,
    ) -> std::result::Result<(), kube::Error> {
        if self.state.lock().unwrap().served.contains(group_version) {
            Ok(())
        } else {
            Err(api_error(
                404,
                "NotFound",
                "the server could not find the requested resource",
            ))
        }
    }
}

#[async_trait]
impl ResourceClient for FakeCluster {
    async fn create<K: ManagedResource>(&self, obj: &K) -> std::result::Result<K, kube::Error> {
        let key = key_of(obj);
        self.record(Op::Create, &key.0)?;

        let mut state = self.state.lock().unwrap();
        if state.objects.contains_key(&key) {
            return Err(api_error(409, "AlreadyExists", "object already exists"));
        }
        state.next_version += 1;
        let mut value = serde_json::to_value(obj).map_err(kube::Error::SerdeError)?;
        value["metadata"]["resourceVersion"] = state.next_version.to_string().into();
        state.objects.insert(key, value.clone());
        serde_json::from_value(value).map_err(kube::Error::SerdeError)
    }

    async fn get<K: ManagedResource>(
        &self,
        namespace: &str,
        name: &str,
    ) -> std::result::Result<K, kube::Error> {
        let kind = K::kind(&()).to_string();
        self.record(Op::Get, &kind)?;

        let state = self.state.lock().unwrap();
        match state
            .objects
            .get(&(kind, namespace.to_string(), name.to_string()))
        {
            Some(value) => serde_json::from_value(value.clone()).map_err(kube::Error::SerdeError),
            None => Err(api_error(404, "NotFound", "object not found")),
        }
    }

    async fn replace<K: ManagedResource>(&self, obj: &K) -> std::result::Result<K, kube::Error> {
        let key = key_of(obj);
        self.record(Op::Replace, &key.0)?;

        let mut state = self.state.lock().unwrap();
        let Some(stored) = state.objects.get(&key) else {
            return Err(api_error(404, "NotFound", "object not found"));
        };
        if stored["metadata"]["resourceVersion"].as_str() != obj.resource_version().as_deref() {
            return Err(api_error(409, "Conflict", "the object has been modified"));
        }

        state.next_version += 1;
        let mut value = serde_json::to_value(obj).map_err(kube::Error::SerdeError)?;
        value["metadata"]["resourceVersion"] = state.next_version.to_string().into();
        state.objects.insert(key, value.clone());
        serde_json::from_value(value).map_err(kube::Error::SerdeError)
    }
}

#[async_trait]
impl ClusterConnector for FakeCluster {
    type Client = FakeCluster;

    async fn connect(&self, _access: &ClusterAccess) -> Result<FakeCluster> {
        let mut state = self.state.lock().unwrap();
        state.connects += 1;
        match &state.connect_error {
            Some(message) => Err(Error::Connectivity(message.clone())),
            None => Ok(self.clone()),
        }
    }
}

pub fn access() -> ClusterAccess {
    ClusterAccess::new("/tmp/flux-bootstrap-test/kubeconfig")
}

/// Short timings so waits finish in milliseconds
pub fn fast_options() -> BootstrapOptions {
    BootstrapOptions {
        poll_interval: Duration::from_millis(5),
        api_timeout: Duration::from_millis(200),
        dependent_timeout: Duration::from_millis(200),
    }
}
