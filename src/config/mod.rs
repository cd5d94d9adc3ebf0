//! Startup configuration.
//!
//! Everything comes from the environment (a `.env` file is honored by
//! `main`), is validated once before any remote call, and is passed by
//! reference into the workflow. Missing or blank required values fail the
//! run immediately.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::cloud::{ClusterSpec, InstanceSpec, SnapshotSource};
use crate::errors::{DrError, Result};
use crate::waiter::WaitPolicy;

/// Symbolic availability-zone choice supplied on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneChoice {
    Primary,
    Secondary,
    Tertiary,
}

impl FromStr for ZoneChoice {
    type Err = DrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "primary" | "primary-az" => Ok(Self::Primary),
            "secondary" | "secondary-az" => Ok(Self::Secondary),
            "tertiary" | "tertiary-az" => Ok(Self::Tertiary),
            other => Err(DrError::InvalidConfiguration(format!(
                "invalid AZ choice '{other}' (expected primary-az, secondary-az or tertiary-az)"
            ))),
        }
    }
}

impl fmt::Display for ZoneChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Primary => "primary-az",
            Self::Secondary => "secondary-az",
            Self::Tertiary => "tertiary-az",
        })
    }
}

/// Static mapping from symbolic zone choices to concrete zone identifiers.
#[derive(Debug, Clone)]
pub struct ZoneMap {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
}

impl ZoneMap {
    /// Resolves a symbolic choice; a blank mapping is a configuration error
    /// and must be caught before any remote call goes out.
    pub fn resolve(&self, choice: ZoneChoice) -> Result<String> {
        let zone = match choice {
            ZoneChoice::Primary => &self.primary,
            ZoneChoice::Secondary => &self.secondary,
            ZoneChoice::Tertiary => &self.tertiary,
        };
        if zone.trim().is_empty() {
            return Err(DrError::InvalidConfiguration(format!(
                "no availability zone configured for {choice}"
            )));
        }
        Ok(zone.clone())
    }
}

#[derive(Debug, Clone)]
pub struct DnsConfig {
    pub hosted_zone_id: String,
    pub record_name: String,
}

#[derive(Debug, Clone)]
pub struct DrConfig {
    pub region: String,
    pub cluster_identifier: String,
    pub instance_identifier: String,
    pub engine: String,
    pub engine_version: String,
    pub instance_class: String,
    pub subnet_group: String,
    pub security_group_id: String,
    pub zones: ZoneMap,
    pub snapshot_source: SnapshotSource,
    /// Present only when the run was asked to update DNS.
    pub dns: Option<DnsConfig>,
    pub destroy_confirmation: Option<String>,
    pub wait: WaitPolicy,
}

impl DrConfig {
    pub fn from_env(needs_dns: bool) -> Result<Self> {
        Self::from_lookup(needs_dns, |key| env::var(key).ok())
    }

    /// Builds and validates the configuration from a key lookup. Tests feed
    /// a map here instead of mutating the process environment.
    pub fn from_lookup<F>(needs_dns: bool, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    DrError::InvalidConfiguration(format!(
                        "required environment variable {key} is not set"
                    ))
                })
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let snapshot_source = match optional("BACKUP_VAULT_NAME") {
            Some(name) => SnapshotSource::Vault { name },
            None => match (optional("SNAPSHOT_TAG_KEY"), optional("SNAPSHOT_TAG_VALUE")) {
                (Some(key), Some(value)) => SnapshotSource::Tag { key, value },
                _ => {
                    return Err(DrError::InvalidConfiguration(
                        "either BACKUP_VAULT_NAME or both SNAPSHOT_TAG_KEY and \
                         SNAPSHOT_TAG_VALUE must be set"
                            .to_string(),
                    ));
                }
            },
        };

        let dns = if needs_dns {
            Some(DnsConfig {
                hosted_zone_id: required("HOSTED_ZONE_ID")?,
                record_name: required("DNS_RECORD_NAME")?,
            })
        } else {
            None
        };

        let default_wait = WaitPolicy::default();
        let wait = WaitPolicy {
            interval: parse_secs(&lookup, "WAIT_POLL_INTERVAL_SECS", default_wait.interval)?,
            deadline: parse_secs(&lookup, "WAIT_TIMEOUT_SECS", default_wait.deadline)?,
        };

        Ok(Self {
            region: required("AWS_REGION")?,
            cluster_identifier: required("DB_CLUSTER_IDENTIFIER")?,
            instance_identifier: required("DB_INSTANCE_IDENTIFIER")?,
            engine: required("DB_ENGINE")?,
            engine_version: required("DB_ENGINE_VERSION")?,
            instance_class: required("DB_INSTANCE_CLASS")?,
            subnet_group: required("DB_SUBNET_GROUP_NAME")?,
            security_group_id: required("VPC_SECURITY_GROUP_ID")?,
            zones: ZoneMap {
                primary: required("AZ_PRIMARY")?,
                secondary: required("AZ_SECONDARY")?,
                tertiary: required("AZ_TERTIARY")?,
            },
            snapshot_source,
            dns,
            destroy_confirmation: optional("DESTROY_CONFIRMATION"),
            wait,
        })
    }

    pub fn cluster_spec(&self, target_zone: &str) -> ClusterSpec {
        ClusterSpec {
            cluster_identifier: self.cluster_identifier.clone(),
            engine: self.engine.clone(),
            engine_version: self.engine_version.clone(),
            subnet_group: self.subnet_group.clone(),
            security_group_id: self.security_group_id.clone(),
            target_zone: target_zone.to_string(),
        }
    }

    pub fn instance_spec(&self, target_zone: &str) -> InstanceSpec {
        InstanceSpec {
            instance_identifier: self.instance_identifier.clone(),
            instance_class: self.instance_class.clone(),
            engine: self.engine.clone(),
            cluster_identifier: self.cluster_identifier.clone(),
            target_zone: target_zone.to_string(),
            publicly_accessible: false,
        }
    }

    /// Destroy proceeds only when DESTROY_CONFIRMATION equals the cluster
    /// identifier exactly. Never defaults to "proceed".
    pub fn destroy_confirmed(&self) -> bool {
        self.destroy_confirmation.as_deref() == Some(self.cluster_identifier.as_str())
    }
}

fn parse_secs<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
            DrError::InvalidConfiguration(format!(
                "{key} must be a whole number of seconds, got '{raw}'"
            ))
        }),
    }
}
