//! In-memory control plane for tests.
//!
//! Records every call so tests can assert on ordering and on calls that
//! must never happen (e.g. no delete when the confirmation gate refuses).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    ClusterSpec, ClusterState, ControlPlane, DnsChangeRequest, InstanceSpec, InstanceState,
    RecoveryPoint, SnapshotSource,
};
use crate::errors::{DrError, Result};

#[derive(Default)]
pub struct FakeControlPlane {
    pub recovery_points: Vec<RecoveryPoint>,
    pub clusters: Mutex<HashMap<String, ClusterState>>,
    pub instances: Mutex<HashMap<String, InstanceState>>,
    pub calls: Mutex<Vec<String>>,
    /// Cluster lookups fail with a transient error.
    pub fail_cluster_lookup: bool,
    /// Restored clusters stay in "creating" forever.
    pub stall_cluster_restore: bool,
}

impl FakeControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_points(mut self, points: Vec<RecoveryPoint>) -> Self {
        self.recovery_points = points;
        self
    }

    pub fn insert_cluster(&self, cluster_identifier: &str, status: &str) {
        self.clusters.lock().unwrap().insert(
            cluster_identifier.to_string(),
            ClusterState {
                status: status.to_string(),
                endpoint: Some(format!("{cluster_identifier}.cluster.example.com")),
                reader_endpoint: Some(format!("{cluster_identifier}.cluster-ro.example.com")),
            },
        );
    }

    pub fn insert_instance(&self, instance_identifier: &str, status: &str) {
        self.instances.lock().unwrap().insert(
            instance_identifier.to_string(),
            InstanceState {
                status: status.to_string(),
            },
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn list_recovery_points(
        &self,
        _source: &SnapshotSource,
        _cluster_identifier: &str,
    ) -> Result<Vec<RecoveryPoint>> {
        self.record("list_recovery_points".to_string());
        Ok(self.recovery_points.clone())
    }

    async fn describe_cluster(&self, cluster_identifier: &str) -> Result<Option<ClusterState>> {
        if self.fail_cluster_lookup {
            return Err(DrError::TransientInfrastructure(
                "cluster lookup failed".to_string(),
            ));
        }
        Ok(self.clusters.lock().unwrap().get(cluster_identifier).cloned())
    }

    async fn describe_instance(&self, instance_identifier: &str) -> Result<Option<InstanceState>> {
        Ok(self
            .instances
            .lock()
            .unwrap()
            .get(instance_identifier)
            .cloned())
    }

    async fn restore_cluster(&self, spec: &ClusterSpec, point: &RecoveryPoint) -> Result<()> {
        self.record(format!(
            "restore_cluster {} zone={} from={}",
            spec.cluster_identifier, spec.target_zone, point.identifier
        ));
        let status = if self.stall_cluster_restore {
            "creating"
        } else {
            "available"
        };
        self.insert_cluster(&spec.cluster_identifier, status);
        Ok(())
    }

    async fn create_instance(&self, spec: &InstanceSpec) -> Result<()> {
        self.record(format!(
            "create_instance {} zone={}",
            spec.instance_identifier, spec.target_zone
        ));
        self.insert_instance(&spec.instance_identifier, "available");
        Ok(())
    }

    async fn delete_instance(&self, instance_identifier: &str) -> Result<bool> {
        self.record(format!("delete_instance {instance_identifier}"));
        Ok(self
            .instances
            .lock()
            .unwrap()
            .remove(instance_identifier)
            .is_some())
    }

    async fn delete_cluster(&self, cluster_identifier: &str) -> Result<bool> {
        self.record(format!("delete_cluster {cluster_identifier}"));
        Ok(self
            .clusters
            .lock()
            .unwrap()
            .remove(cluster_identifier)
            .is_some())
    }

    async fn upsert_dns_record(&self, change: &DnsChangeRequest) -> Result<String> {
        self.record(format!(
            "upsert_dns {} -> {} ttl={}",
            change.record_name, change.value, change.ttl
        ));
        Ok("chg-fake-1".to_string())
    }
}
