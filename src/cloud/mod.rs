//! Value objects and the seam over the cloud control plane.
//!
//! Everything here is a transient, process-local snapshot of remote state;
//! the remote resources themselves are the source of truth and every run
//! re-derives state by querying them.

pub mod aws;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;

/// A point-in-time backup reference usable to restore the cluster.
/// Read-only to this tool; the backup subsystem owns it.
#[derive(Debug, Clone)]
pub struct RecoveryPoint {
    pub identifier: String,
    pub created_at: DateTime<Utc>,
    /// ARN or identifier of the cluster the point was taken from.
    pub resource_reference: String,
    pub tags: Vec<(String, String)>,
}

/// Where the snapshot locator looks for candidate recovery points.
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    /// Recovery points in a backup vault, listed by resource ARN.
    Vault { name: String },
    /// Manual cluster snapshots carrying a marker tag.
    Tag { key: String, value: String },
}

/// Desired state for the restored cluster. Built once per run from
/// configuration, never mutated.
#[derive(Debug, Clone)]
pub struct ClusterSpec {
    pub cluster_identifier: String,
    pub engine: String,
    pub engine_version: String,
    pub subnet_group: String,
    pub security_group_id: String,
    pub target_zone: String,
}

/// Desired state for the compute instance attached to the cluster.
#[derive(Debug, Clone)]
pub struct InstanceSpec {
    pub instance_identifier: String,
    pub instance_class: String,
    pub engine: String,
    pub cluster_identifier: String,
    pub target_zone: String,
    pub publicly_accessible: bool,
}

/// Upsert request for the DNS alias. Always a CNAME with a short TTL so a
/// cutover propagates fast.
#[derive(Debug, Clone)]
pub struct DnsChangeRequest {
    pub hosted_zone_id: String,
    pub record_name: String,
    pub ttl: i64,
    pub value: String,
}

impl DnsChangeRequest {
    pub const TTL_SECONDS: i64 = 60;

    pub fn cname(hosted_zone_id: &str, record_name: &str, value: &str) -> Self {
        Self {
            hosted_zone_id: hosted_zone_id.to_string(),
            record_name: record_name.to_string(),
            ttl: Self::TTL_SECONDS,
            value: value.to_string(),
        }
    }
}

/// Observed state of a remote cluster.
#[derive(Debug, Clone)]
pub struct ClusterState {
    pub status: String,
    pub endpoint: Option<String>,
    pub reader_endpoint: Option<String>,
}

impl ClusterState {
    pub fn is_available(&self) -> bool {
        self.status == "available"
    }
}

/// Observed state of a remote instance.
#[derive(Debug, Clone)]
pub struct InstanceState {
    pub status: String,
}

impl InstanceState {
    pub fn is_available(&self) -> bool {
        self.status == "available"
    }
}

/// Remote operations the workflow consumes. All calls are potentially slow
/// and carry their own failure taxonomy:
///
/// - `describe_*` return `Ok(None)` when the resource does not exist and
///   `TransientInfrastructure` for any other lookup failure;
/// - `delete_*` return `Ok(false)` when there was nothing to delete;
/// - mutating calls map rejections to `RemoteOperation`.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn list_recovery_points(
        &self,
        source: &SnapshotSource,
        cluster_identifier: &str,
    ) -> Result<Vec<RecoveryPoint>>;

    async fn describe_cluster(&self, cluster_identifier: &str) -> Result<Option<ClusterState>>;

    async fn describe_instance(&self, instance_identifier: &str) -> Result<Option<InstanceState>>;

    async fn restore_cluster(&self, spec: &ClusterSpec, point: &RecoveryPoint) -> Result<()>;

    async fn create_instance(&self, spec: &InstanceSpec) -> Result<()>;

    async fn delete_instance(&self, instance_identifier: &str) -> Result<bool>;

    async fn delete_cluster(&self, cluster_identifier: &str) -> Result<bool>;

    async fn upsert_dns_record(&self, change: &DnsChangeRequest) -> Result<String>;
}
