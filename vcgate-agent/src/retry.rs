//! Bounded retry of one action command inside a held connection.
//!
//! Attempt 1 runs immediately; each later attempt is logged as a retry. No
//! backoff: the handler's own timeout bounds every attempt. The first
//! success ends the loop. After the last attempt the final error is
//! returned inside [`VcError::RetriesExhausted`].

use std::future::Future;

use tracing::{error, info, warn};

use vcgate_domain::{Result, VcError};

// ---

pub async fn retry<F, Fut>(vin: &str, command: &str, max_attempts: u32, mut handler: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    // ---
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match handler().await {
            Ok(()) => {
                info!(vin, command, attempt, "command succeeded");
                return Ok(());
            }
            Err(e) if attempt >= max_attempts => {
                error!(vin, command, attempts = attempt, error = %e, "giving up on command");
                return Err(VcError::RetriesExhausted {
                    command: command.to_owned(),
                    attempts: attempt,
                    last: Box::new(e),
                });
            }
            Err(e) => {
                warn!(vin, command, attempt, error = %e, "command attempt failed");
            }
        }

        attempt += 1;
        info!(vin, command, attempt, max_attempts, "retrying command");
    }
}

// ---

#[cfg(test)]
mod tests {
    // ---
    use std::sync::atomic::{AtomicU32, Ordering};

    use vcgate_domain::VcError;

    use super::retry;

    /// Handler that fails its first `failures` calls, counting every call.
    fn flaky(calls: &AtomicU32, failures: u32) -> impl FnMut() -> std::future::Ready<vcgate_domain::Result<()>> + '_ {
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n <= failures {
                Err(VcError::Rejected(format!("attempt {n}")))
            } else {
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn first_success_is_not_repeated() {
        let calls = AtomicU32::new(0);
        retry("VIN", "wake_up", 3, flaky(&calls, 0)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn two_failures_then_success() {
        let calls = AtomicU32::new(0);
        retry("VIN", "wake_up", 3, flaky(&calls, 2)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn always_failing_exhausts_and_keeps_last_error() {
        // ---
        let calls = AtomicU32::new(0);
        let err = retry("VIN", "charge_start", 3, flaky(&calls, u32::MAX))
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match err {
            VcError::RetriesExhausted {
                command,
                attempts,
                last,
            } => {
                assert_eq!(command, "charge_start");
                assert_eq!(attempts, 3);
                assert!(matches!(*last, VcError::Rejected(ref r) if r == "attempt 3"));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_ceiling_still_runs_once() {
        let calls = AtomicU32::new(0);
        assert!(retry("VIN", "pair", 0, flaky(&calls, 5)).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
