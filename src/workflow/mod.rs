//! Workflow driver.
//!
//! Composes the snapshot locator, restore orchestrator, destroy
//! orchestrator and DNS cutover according to the requested action, and
//! reports a single outcome per run.

pub mod destroy;
pub mod dns;
pub mod restore;

use std::fmt;
use std::str::FromStr;

use crate::cloud::ControlPlane;
use crate::config::{DrConfig, ZoneChoice};
use crate::errors::{DrError, Result};
use crate::snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Destroy,
}

impl FromStr for Action {
    type Err = DrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Self::Create),
            "destroy" => Ok(Self::Destroy),
            other => Err(DrError::InvalidConfiguration(format!(
                "invalid action '{other}' (expected create or destroy)"
            ))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Destroy => "destroy",
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunRequest {
    pub action: Action,
    pub zone: ZoneChoice,
    pub update_dns: bool,
}

/// Terminal outcome of a run. Every variant maps to exit code 0; failures
/// travel as `DrError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSummary {
    Restored { endpoint: String },
    AlreadyPresent,
    Destroyed,
    DestroyAborted,
}

pub async fn run(
    plane: &dyn ControlPlane,
    config: &DrConfig,
    request: &RunRequest,
) -> Result<RunSummary> {
    match request.action {
        Action::Create => run_create(plane, config, request).await,
        Action::Destroy => {
            if request.update_dns {
                println!("ℹ️ The DNS update flag has no effect on destroy.");
            }
            destroy::destroy(plane, config).await
        }
    }
}

async fn run_create(
    plane: &dyn ControlPlane,
    config: &DrConfig,
    request: &RunRequest,
) -> Result<RunSummary> {
    // Resolve the zone before anything goes out over the wire, so a bad
    // mapping cannot leave partial remote state.
    let target_zone = config.zones.resolve(request.zone)?;

    if cluster_exists(plane, &config.cluster_identifier).await? {
        println!(
            "⚠️ Cluster '{}' already exists. Skipping restore.",
            config.cluster_identifier
        );
        return Ok(RunSummary::AlreadyPresent);
    }

    let point =
        snapshot::locate_latest(plane, &config.snapshot_source, &config.cluster_identifier).await?;
    let endpoints = restore::restore(
        plane,
        &point,
        &config.cluster_spec(&target_zone),
        &config.instance_spec(&target_zone),
        config.wait,
    )
    .await?;

    if request.update_dns {
        let dns = config.dns.as_ref().ok_or_else(|| {
            DrError::InvalidConfiguration(
                "DNS update requested but HOSTED_ZONE_ID/DNS_RECORD_NAME are not configured"
                    .to_string(),
            )
        })?;
        dns::update_alias(plane, dns, &config.cluster_identifier).await?;
    }

    Ok(RunSummary::Restored {
        endpoint: endpoints.writer,
    })
}

/// Existence guard for the create path. "Not found" is an expected outcome
/// of the lookup, not an error; anything else propagates.
pub async fn cluster_exists(plane: &dyn ControlPlane, cluster_identifier: &str) -> Result<bool> {
    Ok(plane.describe_cluster(cluster_identifier).await?.is_some())
}
