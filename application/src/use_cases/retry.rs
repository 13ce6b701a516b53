//! Retry policy for agent calls.
//!
//! Transient failures are retried with capped exponential backoff. A
//! cancellation or deadline error is not retryable: it is returned at once,
//! as is any other non-retryable error. Backoff sleeps wake early when the
//! context finishes.

use crate::config::RetryConfig;
use crate::context::CallContext;
use crate::ports::agent_capability::AgentError;
use std::future::Future;
use tracing::{debug, warn};

/// Bounded exponential backoff around one agent call
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `attempt` until it succeeds, fails for good, or the context ends
    ///
    /// `attempt` receives the 0-indexed attempt number.
    pub async fn execute<T, F, Fut>(&self, ctx: &CallContext, mut attempt: F) -> Result<T, AgentError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AgentError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut n = 0;

        loop {
            if let Some(reason) = ctx.error() {
                return Err(AgentError::CancelledBeforeAttempt {
                    attempt: n + 1,
                    reason,
                });
            }

            let error = match attempt(n).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if !error.is_retryable() {
                debug!("Attempt {} failed with non-retryable error: {}", n + 1, error);
                return Err(error);
            }

            if n + 1 >= max_attempts {
                return Err(AgentError::RetriesExhausted {
                    attempts: n + 1,
                    source: Box::new(error),
                });
            }

            let delay = self.config.delay_for(n);
            warn!(
                "Attempt {}/{} failed: {} (retrying in {:?})",
                n + 1,
                max_attempts,
                error,
                delay
            );

            if let Err(reason) = ctx.sleep(delay).await {
                return Err(AgentError::CancelledDuringBackoff {
                    attempt: n + 1,
                    reason,
                });
            }
            n += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            multiplier: 2.0,
        })
    }

    /// Fails the first `failures` calls, then succeeds with the call number
    fn flaky(calls: &Arc<AtomicU32>, failures: u32) -> impl FnMut(u32) -> std::future::Ready<Result<u32, AgentError>> {
        let calls = Arc::clone(calls);
        move |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n <= failures {
                Err(AgentError::Request(format!("failure {n}")))
            } else {
                Ok(n)
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_two_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = policy(3).execute(&CallContext::new(), flaky(&calls, 2)).await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempts_and_waits_for_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let result = policy(3)
            .execute(&CallContext::new(), flaky(&calls, u32::MAX))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 100ms after the first failure, 200ms after the second
        assert!(started.elapsed() >= Duration::from_millis(300));
        match result {
            Err(AgentError::RetriesExhausted { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert_eq!(source.to_string(), "Request failed: failure 3");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success_does_not_sleep() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();
        let result = policy(3).execute(&CallContext::new(), flaky(&calls, 0)).await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff_aborts_sleep() {
        let calls = Arc::new(AtomicU32::new(0));
        let ctx = CallContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let result = RetryPolicy::new(RetryConfig {
            max_attempts: 5,
            initial_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(10),
            multiplier: 1.0,
        })
        .execute(&ctx, flaky(&calls, u32::MAX))
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::from_millis(50));
        assert!(matches!(
            result,
            Err(AgentError::CancelledDuringBackoff {
                attempt: 1,
                reason: ContextError::Cancelled
            })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let ctx = CallContext::new();
        ctx.cancel();

        let result = policy(3).execute(&ctx, flaky(&calls, 0)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(
            result,
            Err(AgentError::CancelledBeforeAttempt { attempt: 1, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), AgentError> = policy(5)
            .execute(&CallContext::new(), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                std::future::ready(Err(AgentError::Context(ContextError::DeadlineExceeded)))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(AgentError::Context(ContextError::DeadlineExceeded))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_numbers_are_zero_indexed() {
        let mut seen = Vec::new();
        let _ = policy(3)
            .execute(&CallContext::new(), |n| {
                seen.push(n);
                std::future::ready(Err::<(), _>(AgentError::Request("x".into())))
            })
            .await;
        assert_eq!(seen, vec![0, 1, 2]);
    }
}
