//! Explicit execution context for batch runs.
//!
//! Owns a multi-threaded tokio runtime and a semaphore that caps how many
//! units run at once. Units are independent: a unit that panics is reported
//! as [`TaskError::Panicked`] and its siblings keep running.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Grace period for in-flight blocking work at shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("task was cancelled")]
    Cancelled,
}

impl From<JoinError> for TaskError {
    fn from(err: JoinError) -> Self {
        if err.is_panic() {
            let payload = err.into_panic();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            TaskError::Panicked(message)
        } else {
            TaskError::Cancelled
        }
    }
}

pub struct ExecutionContext {
    runtime: Runtime,
    permits: Arc<Semaphore>,
    max_parallel: usize,
}

impl ExecutionContext {
    pub fn new(max_parallel: usize) -> std::io::Result<Self> {
        let max_parallel = max_parallel.max(1);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("courtside-worker")
            .build()?;
        tracing::debug!(max_parallel, "Execution context started");
        Ok(Self {
            runtime,
            permits: Arc::new(Semaphore::new(max_parallel)),
            max_parallel,
        })
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Run a future to completion on the context's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Run `work` on every unit on the blocking pool.
    ///
    /// `on_complete` sees each result as it finishes; results are returned in
    /// completion order.
    pub fn run_blocking<U, R, F>(
        &self,
        units: Vec<U>,
        work: F,
        on_complete: impl FnMut(&Result<R, TaskError>),
    ) -> Vec<Result<R, TaskError>>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: Fn(U) -> R + Send + Sync + 'static,
    {
        let work = Arc::new(work);
        let mut set = JoinSet::new();
        for unit in units {
            let permits = Arc::clone(&self.permits);
            let work = Arc::clone(&work);
            set.spawn_on(
                async move {
                    let _permit = permits.acquire_owned().await.map_err(|_| TaskError::Cancelled)?;
                    tokio::task::spawn_blocking(move || (*work)(unit))
                        .await
                        .map_err(TaskError::from)
                },
                self.runtime.handle(),
            );
        }
        self.drain(set, on_complete)
    }

    /// Run the async `work` on every unit. Same reporting as
    /// [`run_blocking`](Self::run_blocking).
    pub fn run_async<U, R, F, Fut>(
        &self,
        units: Vec<U>,
        work: F,
        on_complete: impl FnMut(&Result<R, TaskError>),
    ) -> Vec<Result<R, TaskError>>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: Fn(U) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let work = Arc::new(work);
        let mut set = JoinSet::new();
        for unit in units {
            let permits = Arc::clone(&self.permits);
            let work = Arc::clone(&work);
            set.spawn_on(
                async move {
                    let _permit = permits.acquire_owned().await.map_err(|_| TaskError::Cancelled)?;
                    // Nested spawn so a panic in `work` surfaces as a JoinError.
                    tokio::spawn((*work)(unit)).await.map_err(TaskError::from)
                },
                self.runtime.handle(),
            );
        }
        self.drain(set, on_complete)
    }

    fn drain<R: Send + 'static>(
        &self,
        mut set: JoinSet<Result<R, TaskError>>,
        mut on_complete: impl FnMut(&Result<R, TaskError>),
    ) -> Vec<Result<R, TaskError>> {
        self.runtime.block_on(async {
            let mut results = Vec::with_capacity(set.len());
            while let Some(joined) = set.join_next().await {
                let result = joined.map_err(TaskError::from).and_then(|r| r);
                on_complete(&result);
                results.push(result);
            }
            results
        })
    }

    /// Stop the runtime, giving blocking work a short grace period.
    pub fn shutdown(self) {
        tracing::debug!("Execution context shutting down");
        self.runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
    }
}
