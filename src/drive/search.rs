//! Bounded worker pool for content search.
//!
//! A fixed number of workers pull items from a shared queue until it is empty.
//! A failed item is logged and skipped; it never stops the other workers.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::task::JoinSet;
use tracing::warn;

use crate::error::Result;

/// Workers used for Drive content search.
pub const SEARCH_CONCURRENCY: usize = 4;

/// Runs `task` over `items` with at most `workers` in flight.
///
/// Items for which `task` returns `Ok(None)` or an error are dropped. Results
/// come back in input order.
pub async fn run_bounded<I, T, F, Fut>(items: Vec<I>, workers: usize, task: F) -> Vec<T>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<T>>> + Send + 'static,
{
    let total = items.len();
    let queue = Arc::new(Mutex::new(items.into_iter().enumerate().collect::<VecDeque<_>>()));
    let task = Arc::new(task);
    let mut set = JoinSet::new();

    for worker in 0..workers.max(1).min(total.max(1)) {
        let queue = Arc::clone(&queue);
        let task = Arc::clone(&task);
        set.spawn(async move {
            let mut found = Vec::new();
            loop {
                // the guard is dropped before awaiting
                let next = match queue.lock() {
                    Ok(mut q) => q.pop_front(),
                    Err(_) => None,
                };
                let Some((index, item)) = next else { break };

                match task(item).await {
                    Ok(Some(value)) => found.push((index, value)),
                    Ok(None) => {}
                    Err(err) => warn!(worker, index, error = %err, "search item failed, skipping"),
                }
            }
            found
        });
    }

    let mut results = Vec::with_capacity(total);
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(found) => results.extend(found),
            Err(err) => warn!(error = %err, "search worker aborted"),
        }
    }
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, value)| value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_never_exceeds_worker_count() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (f, p) = (Arc::clone(&in_flight), Arc::clone(&peak));
        let results = run_bounded((0..12).collect(), SEARCH_CONCURRENCY, move |n: u32| {
            let (in_flight, peak) = (Arc::clone(&f), Arc::clone(&p));
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(Some(n))
            }
        })
        .await;

        assert_eq!(results, (0..12).collect::<Vec<_>>());
        assert_eq!(peak.load(Ordering::SeqCst), SEARCH_CONCURRENCY);
    }

    #[tokio::test]
    async fn test_failures_are_skipped() {
        let results = run_bounded(vec![1, 2, 3, 4, 5, 6], 4, |n: i32| async move {
            match n {
                2 => Err(AppError::Upstream("boom".into())),
                5 => Ok(None),
                _ => Ok(Some(n * 10)),
            }
        })
        .await;

        assert_eq!(results, vec![10, 30, 40, 60]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let results: Vec<u8> = run_bounded(Vec::<u8>::new(), 4, |n| async move { Ok(Some(n)) }).await;
        assert!(results.is_empty());
    }

    #[test]
    fn test_runs_on_blocking_executor() {
        let results = tokio_test::block_on(run_bounded(vec!["a", "b"], 2, |s: &'static str| async move {
            Ok(Some(s.to_uppercase()))
        }));
        assert_eq!(results, vec!["A".to_string(), "B".to_string()]);
    }
}
