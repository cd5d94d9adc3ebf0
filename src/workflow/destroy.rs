//! Teardown orchestration.
//!
//! Instance first, then cluster, each followed by a wait until the resource
//! is gone. Deleting a resource that is already absent is success for that
//! step; any other failure aborts the rest of the sequence.

use super::RunSummary;
use crate::cloud::ControlPlane;
use crate::config::DrConfig;
use crate::errors::Result;
use crate::waiter::wait_until;

pub async fn destroy(plane: &dyn ControlPlane, config: &DrConfig) -> Result<RunSummary> {
    if !config.destroy_confirmed() {
        println!(
            "🛑 Destroy not confirmed: set DESTROY_CONFIRMATION to the cluster identifier \
             '{}' to proceed. Nothing was deleted.",
            config.cluster_identifier
        );
        return Ok(RunSummary::DestroyAborted);
    }

    println!("🧹 Deleting DR instance and cluster...");

    let instance_id = config.instance_identifier.as_str();
    if plane.delete_instance(instance_id).await? {
        println!("🧩 Instance deletion initiated.");
        println!("⏳ Waiting for instance {instance_id} to be deleted...");
        wait_until(
            &format!("instance {instance_id} to be deleted"),
            config.wait,
            move || async move {
                Ok(match plane.describe_instance(instance_id).await? {
                    None => Some(()),
                    Some(_) => None,
                })
            },
        )
        .await?;
        println!("✅ Instance deleted.");
    } else {
        println!("⚠️ No instance '{instance_id}' found; skipping instance deletion.");
    }

    let cluster_id = config.cluster_identifier.as_str();
    if plane.delete_cluster(cluster_id).await? {
        println!("🧩 Cluster deletion initiated.");
        println!("⏳ Waiting for cluster {cluster_id} to be deleted...");
        wait_until(
            &format!("cluster {cluster_id} to be deleted"),
            config.wait,
            move || async move {
                Ok(match plane.describe_cluster(cluster_id).await? {
                    None => Some(()),
                    Some(_) => None,
                })
            },
        )
        .await?;
        println!("✅ Cluster deleted.");
    } else {
        println!("⚠️ No cluster '{cluster_id}' found; skipping cluster deletion.");
    }

    Ok(RunSummary::Destroyed)
}
