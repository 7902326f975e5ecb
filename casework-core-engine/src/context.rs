use casework_core_api::{LifecycleError, LifecycleResult};
use casework_core_db::repository::RepositoryError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;

/// Per-request deadline and cancellation for every data-store call the
/// engine makes on behalf of a caller.
#[derive(Debug, Clone)]
pub struct CallContext {
    timeout: Duration,
    cancel: CancellationToken,
}

impl CallContext {
    pub fn new(timeout: Duration) -> Self {
        Self::with_cancellation(timeout, CancellationToken::new())
    }

    pub fn with_cancellation(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.call_timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Runs one gateway call under this context.
    ///
    /// Cancellation wins over completion; an elapsed timeout becomes
    /// `Timeout`; repository failures become `DatabaseError`.
    pub async fn run<T, F>(&self, call: F) -> LifecycleResult<T>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(LifecycleError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(LifecycleError::Cancelled),
            result = tokio::time::timeout(self.timeout, call) => match result {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(LifecycleError::DatabaseError(e.to_string())),
                Err(_) => Err(LifecycleError::Timeout {
                    millis: self.timeout.as_millis() as u64,
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_values_through() {
        let ctx = CallContext::new(Duration::from_secs(1));
        let value = tokio_test::assert_ok!(ctx.run(async { Ok::<_, RepositoryError>(5) }).await);
        assert_eq!(value, 5);
    }

    #[tokio::test]
    async fn test_repository_errors_become_database_errors() {
        let ctx = CallContext::new(Duration::from_secs(1));
        let result: LifecycleResult<()> = ctx
            .run(async { Err::<(), RepositoryError>("connection refused".into()) })
            .await;
        assert_eq!(
            result,
            Err(LifecycleError::DatabaseError("connection refused".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_calls_time_out() {
        let ctx = CallContext::new(Duration::from_millis(50));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, RepositoryError>(())
            })
            .await;
        assert_eq!(result, Err(LifecycleError::Timeout { millis: 50 }));
    }

    #[tokio::test]
    async fn test_cancelled_context_skips_the_call() {
        let ctx = CallContext::new(Duration::from_secs(1));
        ctx.cancellation_token().cancel();
        let result = ctx
            .run(async { Ok::<_, RepositoryError>(1) })
            .await;
        assert_eq!(result, Err(LifecycleError::Cancelled));
    }
}
