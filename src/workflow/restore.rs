//! Restore orchestration.
//!
//! Linear sequence with no branching once entered: restore the cluster from
//! the recovery point, wait until it is available, create the instance in
//! the same zone, wait again, then resolve the endpoints.

use crate::cloud::{ClusterSpec, ControlPlane, InstanceSpec, RecoveryPoint};
use crate::errors::{DrError, Result};
use crate::waiter::{WaitPolicy, wait_until};

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub writer: String,
    pub reader: Option<String>,
}

pub async fn restore(
    plane: &dyn ControlPlane,
    point: &RecoveryPoint,
    cluster_spec: &ClusterSpec,
    instance_spec: &InstanceSpec,
    wait: WaitPolicy,
) -> Result<Endpoints> {
    let cluster_id = cluster_spec.cluster_identifier.as_str();
    let instance_id = instance_spec.instance_identifier.as_str();

    println!(
        "🚀 Restoring cluster {cluster_id} in {} from {}...",
        cluster_spec.target_zone, point.identifier
    );
    plane.restore_cluster(cluster_spec, point).await?;
    println!("⏳ Waiting for cluster {cluster_id} to become available...");
    wait_until(
        &format!("cluster {cluster_id} to become available"),
        wait,
        move || async move {
            Ok(plane
                .describe_cluster(cluster_id)
                .await?
                .filter(|c| c.is_available())
                .map(|_| ()))
        },
    )
    .await?;
    println!("✅ Cluster is available.");

    println!(
        "🛠️ Creating instance {instance_id} in {}...",
        instance_spec.target_zone
    );
    plane.create_instance(instance_spec).await?;
    println!("⏳ Waiting for instance {instance_id} to become available...");
    wait_until(
        &format!("instance {instance_id} to become available"),
        wait,
        move || async move {
            Ok(plane
                .describe_instance(instance_id)
                .await?
                .filter(|i| i.is_available())
                .map(|_| ()))
        },
    )
    .await?;
    println!("✅ Instance is available.");

    let cluster = plane.describe_cluster(cluster_id).await?.ok_or_else(|| {
        DrError::RemoteOperation(format!("cluster {cluster_id} disappeared after restore"))
    })?;
    let writer = cluster.endpoint.ok_or_else(|| {
        DrError::RemoteOperation(format!("cluster {cluster_id} has no writer endpoint"))
    })?;

    println!();
    println!("🔎 Post-restore summary:");
    println!("✅ Writer endpoint: {writer}");
    if let Some(reader) = &cluster.reader_endpoint {
        println!("📚 Reader endpoint: {reader}");
    }
    println!("🗂️ Cluster id:      {cluster_id}");
    println!("💡 Instance id:     {instance_id}");

    Ok(Endpoints {
        writer,
        reader: cluster.reader_endpoint,
    })
}
