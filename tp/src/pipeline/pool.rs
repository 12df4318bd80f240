//! Bounded worker pool for capability calls
//!
//! Every call runs as its own tokio task behind a semaphore permit, with a
//! per-call timeout. A panicking capability surfaces as
//! `CapabilityError::Panicked` instead of unwinding into the controller, and
//! dropping the awaiting future aborts the task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::capability::CapabilityError;
use crate::config::PipelineConfig;

pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: usize,
    timeout: Duration,
}

/// Aborts the task when the awaiting side goes away
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl WorkerPool {
    pub fn new(size: usize, timeout: Duration) -> Self {
        let size = size.max(1);
        debug!(size, ?timeout, "WorkerPool::new: called");
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
            timeout,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.worker_pool_size, config.capability_timeout())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Permits not currently held by a running call
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Run one capability call on the pool
    pub async fn run<T, F>(&self, name: &'static str, call: F) -> Result<T, CapabilityError>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, CapabilityError>> + Send + 'static,
    {
        debug!(%name, "WorkerPool::run: called");
        let semaphore = self.semaphore.clone();
        let timeout = self.timeout;

        let handle = tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| CapabilityError::Unavailable("worker pool closed".to_string()))?;
            match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(CapabilityError::Timeout(timeout)),
            }
        });

        let mut guard = AbortOnDrop(handle);
        match (&mut guard.0).await {
            Ok(result) => {
                if let Err(e) = &result {
                    debug!(%name, error = %e, "WorkerPool::run: call failed");
                }
                result
            }
            Err(e) if e.is_panic() => {
                let payload = e.into_panic();
                let message = payload
                    .downcast_ref::<String>()
                    .cloned()
                    .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!(%name, %message, "WorkerPool::run: capability panicked");
                Err(CapabilityError::Panicked(message))
            }
            Err(e) => {
                debug!(%name, error = %e, "WorkerPool::run: task cancelled");
                Err(CapabilityError::Unavailable(format!("{} cancelled", name)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_run_returns_result() {
        let pool = WorkerPool::new(2, Duration::from_secs(1));
        let value = pool.run("ok", async { Ok::<_, CapabilityError>(42) }).await.unwrap();
        assert_eq!(value, 42);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test]
    async fn test_timeout() {
        let pool = WorkerPool::new(1, Duration::from_millis(20));
        let result = pool
            .run("slow", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, CapabilityError>(())
            })
            .await;
        assert!(matches!(result, Err(CapabilityError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let pool = WorkerPool::new(1, Duration::from_secs(1));
        let result: Result<(), _> = pool
            .run("boom", async {
                if true {
                    panic!("research exploded");
                }
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(CapabilityError::Panicked(msg)) if msg.contains("research exploded")));

        // The pool still works afterwards
        assert_eq!(pool.run("after", async { Ok::<_, CapabilityError>(1) }).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let pool = Arc::new(WorkerPool::new(2, Duration::from_secs(5)));
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let calls = (0..6).map(|_| {
            let pool = pool.clone();
            let running = running.clone();
            let peak = peak.clone();
            async move {
                pool.run("bounded", async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, CapabilityError>(())
                })
                .await
            }
        });
        let results = futures::future::join_all(calls).await;

        assert!(results.iter().all(Result::is_ok));
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_dropping_caller_aborts_task() {
        let pool = WorkerPool::new(1, Duration::from_secs(5));
        let finished = Arc::new(AtomicUsize::new(0));
        let flag = finished.clone();

        let call = pool.run("abandoned", async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CapabilityError>(())
        });
        let _ = tokio::time::timeout(Duration::from_millis(5), call).await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
        assert_eq!(pool.available(), 1);
    }
}
