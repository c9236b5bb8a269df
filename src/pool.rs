use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

/// Where a phase's tasks run. The pipeline hands over a whole batch and
/// waits for every result; completion order carries no meaning. The
/// bundled [`BoundedPool`] spawns onto tokio, other backends can ship the
/// batch wherever they like.
#[async_trait]
pub trait TaskPool: Send + Sync {
    /// Runs every task to completion and returns the results in whatever
    /// order they finished.
    async fn run_all<T>(&self, tasks: Vec<BoxFuture<'static, T>>) -> Vec<T>
    where
        T: Send + 'static;
}

/// Tokio-backed pool capping in-flight tasks with a semaphore.
#[derive(Debug, Clone)]
pub struct BoundedPool {
    permits: Arc<Semaphore>,
}

impl BoundedPool {
    /// A pool running at most `size` tasks at once, floored at one.
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size.max(1))),
        }
    }
}

#[async_trait]
impl TaskPool for BoundedPool {
    async fn run_all<T>(&self, tasks: Vec<BoxFuture<'static, T>>) -> Vec<T>
    where
        T: Send + 'static,
    {
        let expected = tasks.len();
        let mut task_set = JoinSet::new();
        for task in tasks {
            let permits = Arc::clone(&self.permits);
            task_set.spawn(async move {
                // The semaphore is never closed while the pool lives.
                let _permit = permits.acquire_owned().await.expect("pool semaphore closed");
                task.await
            });
        }

        let mut results = Vec::with_capacity(expected);
        while let Some(joined) = task_set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                // A panicked task forfeits its result, siblings keep going.
                Err(error) => warn!(%error, "pool task did not finish"),
            }
        }
        results
    }
}
