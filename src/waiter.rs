//! Bounded polling for remote resources.
//!
//! The cloud side exposes no push notification for state changes, so every
//! "wait until available/deleted" step is a poll loop with an explicit
//! deadline. Cancelling the caller simply drops the future; no compensating
//! remote call is issued.

use std::future::Future;
use std::time::Duration;

use crate::errors::{DrError, Result};

/// Polling cadence and overall deadline for a wait step.
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub deadline: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            deadline: Duration::from_secs(40 * 60),
        }
    }
}

/// Polls `probe` until it reports the resource ready (`Some`) or the
/// deadline elapses. A probe error aborts the wait immediately.
pub async fn wait_until<T, F, Fut>(what: &str, policy: WaitPolicy, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let started = tokio::time::Instant::now();
    loop {
        if let Some(ready) = probe().await? {
            return Ok(ready);
        }
        if started.elapsed() >= policy.deadline {
            return Err(DrError::ProvisioningTimeout(format!(
                "gave up waiting for {what} after {:?}; inspect the cloud console before retrying",
                policy.deadline
            )));
        }
        tokio::time::sleep(policy.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn quick_policy() -> WaitPolicy {
        WaitPolicy {
            interval: Duration::from_secs(1),
            deadline: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn returns_as_soon_as_probe_reports_ready() {
        let result = wait_until("thing", quick_policy(), || async { Ok(Some(42)) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_ready() {
        let attempts = Cell::new(0u32);
        let probe = &attempts;
        let result = wait_until("thing", quick_policy(), move || async move {
            probe.set(probe.get() + 1);
            if probe.get() >= 3 {
                Ok(Some("ready"))
            } else {
                Ok(None)
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ready");
        assert_eq!(attempts.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_resource_never_ready() {
        let result =
            wait_until::<(), _, _>("stuck thing", quick_policy(), || async { Ok(None) }).await;
        match result {
            Err(DrError::ProvisioningTimeout(msg)) => assert!(msg.contains("stuck thing")),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn probe_errors_abort_the_wait() {
        let result = wait_until::<(), _, _>("thing", quick_policy(), || async {
            Err(DrError::TransientInfrastructure("lookup failed".to_string()))
        })
        .await;
        assert!(matches!(result, Err(DrError::TransientInfrastructure(_))));
    }
}
