//! AWS implementation of the control-plane seam.
//!
//! RDS for cluster/instance lifecycle, Backup for vault recovery points,
//! Route53 for the alias record and STS to resolve the account id used in
//! the cluster resource ARN.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_rds::error::DisplayErrorContext;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    ClusterSpec, ClusterState, ControlPlane, DnsChangeRequest, InstanceSpec, InstanceState,
    RecoveryPoint, SnapshotSource,
};
use crate::errors::{DrError, Result};

pub struct AwsControlPlane {
    rds: aws_sdk_rds::Client,
    backup: aws_sdk_backup::Client,
    route53: aws_sdk_route53::Client,
    region: String,
    account_id: String,
}

impl AwsControlPlane {
    /// Builds the SDK clients and resolves the caller identity up front so
    /// a credential problem surfaces before any workflow step runs.
    pub async fn connect(region: &str) -> Result<Self> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        let sts = aws_sdk_sts::Client::new(&sdk_config);
        let identity = sts.get_caller_identity().send().await.map_err(|e| {
            DrError::TransientInfrastructure(format!(
                "failed to resolve caller identity: {}",
                DisplayErrorContext(&e)
            ))
        })?;
        let account_id = identity
            .account()
            .ok_or_else(|| {
                DrError::TransientInfrastructure(
                    "caller identity did not include an account id".to_string(),
                )
            })?
            .to_string();

        Ok(Self {
            rds: aws_sdk_rds::Client::new(&sdk_config),
            backup: aws_sdk_backup::Client::new(&sdk_config),
            route53: aws_sdk_route53::Client::new(&sdk_config),
            region: region.to_string(),
            account_id,
        })
    }

    fn cluster_arn(&self, cluster_identifier: &str) -> String {
        format!(
            "arn:aws:rds:{}:{}:cluster:{}",
            self.region, self.account_id, cluster_identifier
        )
    }
}

fn to_utc(ts: &aws_sdk_rds::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

#[async_trait]
impl ControlPlane for AwsControlPlane {
    async fn list_recovery_points(
        &self,
        source: &SnapshotSource,
        cluster_identifier: &str,
    ) -> Result<Vec<RecoveryPoint>> {
        match source {
            SnapshotSource::Vault { name } => {
                let resource_arn = self.cluster_arn(cluster_identifier);
                let response = self
                    .backup
                    .list_recovery_points_by_resource()
                    .resource_arn(&resource_arn)
                    .send()
                    .await
                    .map_err(|e| {
                        DrError::RemoteOperation(format!(
                            "failed to list recovery points for {resource_arn}: {}",
                            DisplayErrorContext(&e)
                        ))
                    })?;

                let points = response
                    .recovery_points()
                    .iter()
                    .filter(|rp| rp.backup_vault_name() == Some(name.as_str()))
                    .filter_map(|rp| {
                        Some(RecoveryPoint {
                            identifier: rp.recovery_point_arn()?.to_string(),
                            created_at: to_utc(rp.creation_date()?)?,
                            resource_reference: resource_arn.clone(),
                            tags: Vec::new(),
                        })
                    })
                    .collect();
                Ok(points)
            }
            SnapshotSource::Tag { .. } => {
                let response = self
                    .rds
                    .describe_db_cluster_snapshots()
                    .snapshot_type("manual")
                    .send()
                    .await
                    .map_err(|e| {
                        DrError::RemoteOperation(format!(
                            "failed to list manual cluster snapshots: {}",
                            DisplayErrorContext(&e)
                        ))
                    })?;

                let points = response
                    .db_cluster_snapshots()
                    .iter()
                    .filter_map(|snap| {
                        Some(RecoveryPoint {
                            identifier: snap.db_cluster_snapshot_identifier()?.to_string(),
                            created_at: to_utc(snap.snapshot_create_time()?)?,
                            resource_reference: snap
                                .db_cluster_identifier()
                                .unwrap_or_default()
                                .to_string(),
                            tags: snap
                                .tag_list()
                                .iter()
                                .filter_map(|t| {
                                    Some((t.key()?.to_string(), t.value()?.to_string()))
                                })
                                .collect(),
                        })
                    })
                    .collect();
                Ok(points)
            }
        }
    }

    async fn describe_cluster(&self, cluster_identifier: &str) -> Result<Option<ClusterState>> {
        match self
            .rds
            .describe_db_clusters()
            .db_cluster_identifier(cluster_identifier)
            .send()
            .await
        {
            Ok(output) => {
                let Some(cluster) = output.db_clusters().first() else {
                    return Ok(None);
                };
                Ok(Some(ClusterState {
                    status: cluster.status().unwrap_or_default().to_string(),
                    endpoint: cluster.endpoint().map(str::to_string),
                    reader_endpoint: cluster.reader_endpoint().map(str::to_string),
                }))
            }
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .map(|e| e.is_db_cluster_not_found_fault())
                    .unwrap_or(false);
                if not_found {
                    Ok(None)
                } else {
                    Err(DrError::TransientInfrastructure(format!(
                        "failed to look up cluster {cluster_identifier}: {}",
                        DisplayErrorContext(&err)
                    )))
                }
            }
        }
    }

    async fn describe_instance(&self, instance_identifier: &str) -> Result<Option<InstanceState>> {
        match self
            .rds
            .describe_db_instances()
            .db_instance_identifier(instance_identifier)
            .send()
            .await
        {
            Ok(output) => {
                let Some(instance) = output.db_instances().first() else {
                    return Ok(None);
                };
                Ok(Some(InstanceState {
                    status: instance.db_instance_status().unwrap_or_default().to_string(),
                }))
            }
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .map(|e| e.is_db_instance_not_found_fault())
                    .unwrap_or(false);
                if not_found {
                    Ok(None)
                } else {
                    Err(DrError::TransientInfrastructure(format!(
                        "failed to look up instance {instance_identifier}: {}",
                        DisplayErrorContext(&err)
                    )))
                }
            }
        }
    }

    async fn restore_cluster(&self, spec: &ClusterSpec, point: &RecoveryPoint) -> Result<()> {
        self.rds
            .restore_db_cluster_from_snapshot()
            .db_cluster_identifier(&spec.cluster_identifier)
            .snapshot_identifier(&point.identifier)
            .engine(&spec.engine)
            .engine_version(&spec.engine_version)
            .db_subnet_group_name(&spec.subnet_group)
            .vpc_security_group_ids(&spec.security_group_id)
            .availability_zones(&spec.target_zone)
            .deletion_protection(false)
            .copy_tags_to_snapshot(true)
            .send()
            .await
            .map_err(|e| {
                DrError::RemoteOperation(format!(
                    "failed to restore cluster {} from {}: {}",
                    spec.cluster_identifier,
                    point.identifier,
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    async fn create_instance(&self, spec: &InstanceSpec) -> Result<()> {
        self.rds
            .create_db_instance()
            .db_instance_identifier(&spec.instance_identifier)
            .db_instance_class(&spec.instance_class)
            .engine(&spec.engine)
            .db_cluster_identifier(&spec.cluster_identifier)
            .availability_zone(&spec.target_zone)
            .publicly_accessible(spec.publicly_accessible)
            .send()
            .await
            .map_err(|e| {
                DrError::RemoteOperation(format!(
                    "failed to create instance {}: {}",
                    spec.instance_identifier,
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    async fn delete_instance(&self, instance_identifier: &str) -> Result<bool> {
        match self
            .rds
            .delete_db_instance()
            .db_instance_identifier(instance_identifier)
            .skip_final_snapshot(true)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .map(|e| e.is_db_instance_not_found_fault())
                    .unwrap_or(false);
                if not_found {
                    Ok(false)
                } else {
                    Err(DrError::RemoteOperation(format!(
                        "failed to delete instance {instance_identifier}: {}",
                        DisplayErrorContext(&err)
                    )))
                }
            }
        }
    }

    async fn delete_cluster(&self, cluster_identifier: &str) -> Result<bool> {
        match self
            .rds
            .delete_db_cluster()
            .db_cluster_identifier(cluster_identifier)
            .skip_final_snapshot(true)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .map(|e| e.is_db_cluster_not_found_fault())
                    .unwrap_or(false);
                if not_found {
                    Ok(false)
                } else {
                    Err(DrError::RemoteOperation(format!(
                        "failed to delete cluster {cluster_identifier}: {}",
                        DisplayErrorContext(&err)
                    )))
                }
            }
        }
    }

    async fn upsert_dns_record(&self, change: &DnsChangeRequest) -> Result<String> {
        use aws_sdk_route53::types::{
            Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
        };

        let build_err = |what: &str, e: aws_sdk_route53::error::BuildError| {
            DrError::RemoteOperation(format!("failed to build DNS {what}: {e}"))
        };

        let record = ResourceRecord::builder()
            .value(&change.value)
            .build()
            .map_err(|e| build_err("record", e))?;
        let record_set = ResourceRecordSet::builder()
            .name(&change.record_name)
            .r#type(RrType::Cname)
            .ttl(change.ttl)
            .resource_records(record)
            .build()
            .map_err(|e| build_err("record set", e))?;
        let upsert = Change::builder()
            .action(ChangeAction::Upsert)
            .resource_record_set(record_set)
            .build()
            .map_err(|e| build_err("change", e))?;
        let batch = ChangeBatch::builder()
            .changes(upsert)
            .build()
            .map_err(|e| build_err("change batch", e))?;

        let response = self
            .route53
            .change_resource_record_sets()
            .hosted_zone_id(&change.hosted_zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| {
                DrError::RemoteOperation(format!(
                    "failed to upsert DNS record {}: {}",
                    change.record_name,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(response
            .change_info()
            .map(|info| info.id().to_string())
            .unwrap_or_default())
    }
}
