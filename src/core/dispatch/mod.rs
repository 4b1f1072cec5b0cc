//! Chunked concurrent dispatch
//!
//! Splits a collection into bounded batches and executes them on a bounded
//! worker pool with a fixed per-task timeout. Output order always matches
//! input order, and one slow or failing task never blocks or aborts its
//! siblings.
//!
//! This is the only place in the pipeline where true parallel execution
//! happens; the surrounding stages are sequential.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Tuning for a dispatch run
#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    /// Maximum items per chunk for [`dispatch_chunks`]
    pub chunk_size: usize,
    /// Fixed timeout applied to each task
    pub task_timeout: Duration,
    /// Maximum tasks in flight; `0` means available parallelism
    pub max_concurrency: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: 25,
            task_timeout: Duration::from_secs(20),
            max_concurrency: 0,
        }
    }
}

impl DispatchConfig {
    /// Concurrency bound with the auto setting resolved
    pub fn effective_concurrency(&self) -> usize {
        if self.max_concurrency > 0 {
            return self.max_concurrency;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }
}

/// Result of one dispatched task
#[derive(Debug)]
pub enum DispatchOutcome<R> {
    /// The task ran to completion within the timeout
    Completed(R),
    /// The task exceeded the per-task timeout; it was isolated, siblings
    /// were unaffected
    TimedOut,
    /// The task aborted before producing a result (e.g. a panic)
    Failed(String),
}

impl<R> DispatchOutcome<R> {
    /// Message describing a non-completed outcome, if any
    pub fn failure_message(&self) -> Option<String> {
        match self {
            DispatchOutcome::Completed(_) => None,
            DispatchOutcome::TimedOut => Some("task timed out".to_string()),
            DispatchOutcome::Failed(message) => Some(message.clone()),
        }
    }
}

/// Runs one task per item on the bounded pool
///
/// Used for per-record work such as data-lake uploads. Results come back in
/// input order.
pub async fn dispatch_each<T, R, F, Fut>(
    items: Vec<T>,
    config: &DispatchConfig,
    worker: F,
) -> Vec<DispatchOutcome<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    run_bounded(items, config, worker).await
}

/// Splits items into ordered chunks of at most `chunk_size` and runs one
/// task per chunk on the bounded pool
///
/// Used for canonical-store batch upserts. The outcome at index `i`
/// corresponds to the `i`-th chunk of the input; chunk boundaries are
/// deterministic, so callers can map outcomes back to their items.
pub async fn dispatch_chunks<T, R, F, Fut>(
    items: Vec<T>,
    config: &DispatchConfig,
    worker: F,
) -> Vec<DispatchOutcome<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(Vec<T>) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    let chunks = split_chunks(items, config.chunk_size);
    run_bounded(chunks, config, worker).await
}

/// Splits `items` into ordered chunks of at most `chunk_size`
pub fn split_chunks<T>(items: Vec<T>, chunk_size: usize) -> Vec<Vec<T>> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(chunk_size));
    let mut current = Vec::with_capacity(chunk_size.min(items.len()));

    for item in items {
        current.push(item);
        if current.len() == chunk_size {
            chunks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

async fn run_bounded<I, R, F, Fut>(
    inputs: Vec<I>,
    config: &DispatchConfig,
    worker: F,
) -> Vec<DispatchOutcome<R>>
where
    I: Send + 'static,
    R: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    if inputs.is_empty() {
        return Vec::new();
    }

    let semaphore = Arc::new(Semaphore::new(config.effective_concurrency()));
    let timeout = config.task_timeout;

    let mut handles = Vec::with_capacity(inputs.len());
    for input in inputs {
        let semaphore = Arc::clone(&semaphore);
        let task = worker(input);
        handles.push(tokio::spawn(async move {
            // The semaphore is never closed, so acquisition cannot fail.
            let _permit = semaphore.acquire_owned().await.ok();
            tokio::time::timeout(timeout, task).await
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for (index, handle) in handles.into_iter().enumerate() {
        let outcome = match handle.await {
            Ok(Ok(result)) => DispatchOutcome::Completed(result),
            Ok(Err(_elapsed)) => {
                tracing::warn!(task = index, timeout_ms = timeout.as_millis() as u64, "Dispatched task timed out");
                DispatchOutcome::TimedOut
            }
            Err(e) => {
                tracing::error!(task = index, error = %e, "Dispatched task aborted");
                DispatchOutcome::Failed(e.to_string())
            }
        };
        outcomes.push(outcome);
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize) -> DispatchConfig {
        DispatchConfig {
            chunk_size,
            task_timeout: Duration::from_secs(5),
            max_concurrency: 4,
        }
    }

    #[test]
    fn test_split_chunks_boundaries() {
        let chunks = split_chunks((0..100).collect::<Vec<_>>(), 25);
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.len() == 25));
        assert_eq!(chunks[0][0], 0);
        assert_eq!(chunks[3][24], 99);
    }

    #[test]
    fn test_split_chunks_remainder() {
        let chunks = split_chunks((0..7).collect::<Vec<_>>(), 3);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2], vec![6]);
    }

    #[test]
    fn test_split_chunks_zero_size_clamped() {
        let chunks = split_chunks(vec![1, 2], 0);
        assert_eq!(chunks.len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_each_preserves_order() {
        let outcomes = dispatch_each(vec![3u64, 1, 2], &config(25), |n| async move {
            // Later items finish first; order must still match the input.
            tokio::time::sleep(Duration::from_millis(n * 20)).await;
            n * 10
        })
        .await;

        let values: Vec<_> = outcomes
            .into_iter()
            .map(|o| match o {
                DispatchOutcome::Completed(v) => v,
                other => panic!("unexpected outcome: {other:?}"),
            })
            .collect();
        assert_eq!(values, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn test_timeout_isolated_from_siblings() {
        let cfg = DispatchConfig {
            chunk_size: 1,
            task_timeout: Duration::from_millis(50),
            max_concurrency: 4,
        };

        let outcomes = dispatch_each(vec![0u64, 200, 0], &cfg, |delay| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            delay
        })
        .await;

        assert!(matches!(outcomes[0], DispatchOutcome::Completed(0)));
        assert!(matches!(outcomes[1], DispatchOutcome::TimedOut));
        assert!(matches!(outcomes[2], DispatchOutcome::Completed(0)));
    }

    #[tokio::test]
    async fn test_panic_isolated_from_siblings() {
        let outcomes = dispatch_each(vec![1, 0, 2], &config(25), |n| async move {
            if n == 0 {
                panic!("worker failure");
            }
            n
        })
        .await;

        assert!(matches!(outcomes[0], DispatchOutcome::Completed(1)));
        assert!(matches!(outcomes[1], DispatchOutcome::Failed(_)));
        assert!(outcomes[1].failure_message().is_some());
        assert!(matches!(outcomes[2], DispatchOutcome::Completed(2)));
    }

    #[tokio::test]
    async fn test_chunked_results_equal_single_batch() {
        let items: Vec<u32> = (0..100).collect();

        let chunked = dispatch_chunks(items.clone(), &config(25), |chunk| async move {
            chunk.into_iter().map(|n| n * 2).collect::<Vec<_>>()
        })
        .await;
        assert_eq!(chunked.len(), 4);

        let whole = dispatch_chunks(items, &config(100), |chunk| async move {
            chunk.into_iter().map(|n| n * 2).collect::<Vec<_>>()
        })
        .await;
        assert_eq!(whole.len(), 1);

        let flatten = |outcomes: Vec<DispatchOutcome<Vec<u32>>>| {
            outcomes
                .into_iter()
                .flat_map(|o| match o {
                    DispatchOutcome::Completed(v) => v,
                    other => panic!("unexpected outcome: {other:?}"),
                })
                .collect::<Vec<_>>()
        };

        assert_eq!(flatten(chunked), flatten(whole));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let outcomes: Vec<DispatchOutcome<u32>> =
            dispatch_each(Vec::<u32>::new(), &config(25), |n| async move { n }).await;
        assert!(outcomes.is_empty());
    }
}
