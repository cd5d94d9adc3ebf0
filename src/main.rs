//! DR lifecycle tool for the managed Aurora cluster.
//!
//! `drtool <create|destroy> <primary-az|secondary-az|tertiary-az> <true|false>`
//!
//! Restores the DR cluster from the newest eligible recovery point into the
//! chosen availability zone (optionally repointing the DNS alias at the new
//! endpoint), or tears the standby down again.

mod cloud;
mod config;
mod errors;
mod snapshot;
mod waiter;
mod workflow;

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};

use cloud::aws::AwsControlPlane;
use config::DrConfig;
use errors::DrError;
use workflow::{Action, RunRequest, RunSummary};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let request = match parse_args() {
        Ok(request) => request,
        Err(e) => {
            eprintln!("❌ {e}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run_app(&request).await {
        Ok(summary) => {
            print_summary(&summary);
            println!("✅ DR operation completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run_app(request: &RunRequest) -> Result<RunSummary> {
    let config = DrConfig::from_env(request.update_dns)
        .context("Failed to load DR configuration from the environment")?;

    println!("🧭 Region: {}", config.region);
    println!("🗂️ Action: {}", request.action);
    println!("🏗️ AZ choice: {}", request.zone);
    println!("🌐 Update DNS: {}", request.update_dns);

    let plane = AwsControlPlane::connect(&config.region)
        .await
        .context("Failed to connect to the cloud control plane")?;

    let summary = workflow::run(&plane, &config, request).await?;
    Ok(summary)
}

fn parse_args() -> Result<RunRequest, DrError> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() != 3 {
        return Err(DrError::InvalidConfiguration(format!(
            "expected exactly three arguments, got {}",
            args.len()
        )));
    }

    let action: Action = args[0].parse()?;
    let zone = args[1].parse()?;
    let update_dns = match args[2].as_str() {
        "true" => true,
        "false" => false,
        other => {
            return Err(DrError::InvalidConfiguration(format!(
                "invalid DNS flag '{other}' (expected true or false)"
            )));
        }
    };

    Ok(RunRequest {
        action,
        zone,
        update_dns,
    })
}

fn print_summary(summary: &RunSummary) {
    match summary {
        RunSummary::Restored { endpoint } => {
            println!("🔗 DR cluster is serving at {endpoint}");
        }
        RunSummary::AlreadyPresent => {
            println!("⚠️ Skipped restore: the cluster already exists.");
        }
        RunSummary::Destroyed => {
            println!("🧹 DR cluster and instance are gone.");
        }
        RunSummary::DestroyAborted => {
            println!("🛑 Destroy was not confirmed; nothing was deleted.");
        }
    }
}

fn print_usage() {
    eprintln!("Usage: drtool <create|destroy> <primary-az|secondary-az|tertiary-az> <true|false>");
}
