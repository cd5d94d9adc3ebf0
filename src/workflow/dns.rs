//! DNS cutover.
//!
//! Repoints the alias record at the restored cluster's writer endpoint.
//! Propagation is not awaited; the 60-second TTL keeps the cutover fast.
//! Runs only on the create path, and only when explicitly requested.

use crate::cloud::{ControlPlane, DnsChangeRequest};
use crate::config::DnsConfig;
use crate::errors::{DrError, Result};

pub async fn update_alias(
    plane: &dyn ControlPlane,
    dns: &DnsConfig,
    cluster_identifier: &str,
) -> Result<String> {
    println!("🌐 Updating DNS record {}...", dns.record_name);

    let cluster = plane.describe_cluster(cluster_identifier).await?.ok_or_else(|| {
        DrError::NotFound(format!(
            "cluster {cluster_identifier} not found while updating DNS"
        ))
    })?;
    let endpoint = cluster.endpoint.ok_or_else(|| {
        DrError::RemoteOperation(format!(
            "cluster {cluster_identifier} has no endpoint to point DNS at"
        ))
    })?;
    println!("🔗 New cluster endpoint: {endpoint}");

    let change = DnsChangeRequest::cname(&dns.hosted_zone_id, &dns.record_name, &endpoint);
    let change_id = plane.upsert_dns_record(&change).await?;
    println!("✅ DNS update initiated (change id: {change_id})");
    Ok(change_id)
}
