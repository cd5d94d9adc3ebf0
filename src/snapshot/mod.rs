//! Snapshot locator.
//!
//! Finds the newest recovery point eligible for the target cluster. The
//! source strategy is picked by configuration: recovery points in a backup
//! vault, or manual snapshots carrying a marker tag.

use crate::cloud::{ControlPlane, RecoveryPoint, SnapshotSource};
use crate::errors::{DrError, Result};

/// Returns the most recent eligible recovery point. An empty candidate set
/// is fatal for the run: there is nothing to restore from.
pub async fn locate_latest(
    plane: &dyn ControlPlane,
    source: &SnapshotSource,
    cluster_identifier: &str,
) -> Result<RecoveryPoint> {
    match source {
        SnapshotSource::Vault { name } => println!(
            "🔍 Searching backup vault '{name}' for recovery points of {cluster_identifier}..."
        ),
        SnapshotSource::Tag { key, value } => {
            println!("🔍 Searching for manual snapshots tagged {key}={value}...")
        }
    }

    let candidates = plane.list_recovery_points(source, cluster_identifier).await?;

    // On a timestamp tie, max_by_key keeps the candidate listed later; the
    // control plane's listing order is not defined.
    let latest = candidates
        .into_iter()
        .filter(|point| is_eligible(point, source, cluster_identifier))
        .max_by_key(|point| point.created_at)
        .ok_or_else(|| {
            DrError::NotFound(format!(
                "no recovery point found for cluster {cluster_identifier}"
            ))
        })?;

    println!(
        "✅ Latest recovery point: {} (created {})",
        latest.identifier, latest.created_at
    );
    Ok(latest)
}

fn is_eligible(point: &RecoveryPoint, source: &SnapshotSource, cluster_identifier: &str) -> bool {
    match source {
        SnapshotSource::Vault { .. } => point.resource_reference.contains(cluster_identifier),
        SnapshotSource::Tag { key, value } => {
            point.tags.iter().any(|(k, v)| k == key && v == value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::fake::FakeControlPlane;
    use chrono::{DateTime, Utc};

    fn point(id: &str, created: &str, resource: &str) -> RecoveryPoint {
        RecoveryPoint {
            identifier: id.to_string(),
            created_at: created.parse::<DateTime<Utc>>().unwrap(),
            resource_reference: resource.to_string(),
            tags: Vec::new(),
        }
    }

    fn tagged(id: &str, created: &str, tags: &[(&str, &str)]) -> RecoveryPoint {
        RecoveryPoint {
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..point(id, created, "cluster-x")
        }
    }

    fn vault() -> SnapshotSource {
        SnapshotSource::Vault {
            name: "dr-vault".to_string(),
        }
    }

    #[tokio::test]
    async fn picks_the_most_recent_recovery_point() {
        let plane = FakeControlPlane::new().with_points(vec![
            point("rp-1", "2024-01-01T00:00:00Z", "arn:cluster-x"),
            point("rp-2", "2024-02-01T00:00:00Z", "arn:cluster-x"),
        ]);
        let latest = locate_latest(&plane, &vault(), "cluster-x").await.unwrap();
        assert_eq!(latest.identifier, "rp-2");
    }

    #[tokio::test]
    async fn empty_candidate_set_is_not_found() {
        let plane = FakeControlPlane::new();
        match locate_latest(&plane, &vault(), "cluster-x").await {
            Err(DrError::NotFound(msg)) => assert!(msg.contains("cluster-x")),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn vault_source_ignores_points_for_other_clusters() {
        let plane = FakeControlPlane::new().with_points(vec![
            point("rp-other", "2024-03-01T00:00:00Z", "arn:cluster-y"),
            point("rp-ours", "2024-01-01T00:00:00Z", "arn:cluster-x"),
        ]);
        let latest = locate_latest(&plane, &vault(), "cluster-x").await.unwrap();
        assert_eq!(latest.identifier, "rp-ours");
    }

    #[tokio::test]
    async fn tag_source_only_accepts_the_configured_marker() {
        let source = SnapshotSource::Tag {
            key: "dr-eligible".to_string(),
            value: "true".to_string(),
        };
        let plane = FakeControlPlane::new().with_points(vec![
            tagged("snap-untagged", "2024-04-01T00:00:00Z", &[]),
            tagged("snap-wrong", "2024-03-01T00:00:00Z", &[("dr-eligible", "false")]),
            tagged("snap-ok", "2024-01-01T00:00:00Z", &[("dr-eligible", "true")]),
        ]);
        let latest = locate_latest(&plane, &source, "cluster-x").await.unwrap();
        assert_eq!(latest.identifier, "snap-ok");
    }
}
