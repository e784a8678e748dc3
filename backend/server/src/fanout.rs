use std::future::Future;

use futures::{StreamExt, TryStreamExt, stream};

/// Runs `f` once per item with at most `limit` calls in flight.
///
/// Results come back in input order regardless of completion order. The first
/// error aborts the remaining calls. `limit = 1` awaits each call before
/// issuing the next.
pub async fn fan_out<I, T, E, F, Fut>(items: I, limit: usize, f: F) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    stream::iter(items)
        .map(f)
        .buffered(limit.max(1))
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use tokio::time::sleep;

    use super::*;

    #[tokio::test]
    async fn test_preserves_input_order() {
        let delays = [30u64, 5, 20, 1, 10];

        let results: Result<Vec<u64>, ()> = fan_out(delays, 5, |ms| async move {
            sleep(Duration::from_millis(ms)).await;
            Ok(ms)
        })
        .await;

        assert_eq!(results.unwrap(), delays);
    }

    #[tokio::test]
    async fn test_respects_limit() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let results: Result<Vec<usize>, ()> = fan_out(0..12, 3, |i| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(i)
            }
        })
        .await;

        assert_eq!(results.unwrap().len(), 12);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_sequential_when_limit_one() {
        let in_flight = Arc::new(AtomicUsize::new(0));

        let results: Result<Vec<usize>, ()> = fan_out(0..5, 1, |i| {
            let in_flight = in_flight.clone();
            async move {
                assert_eq!(in_flight.fetch_add(1, Ordering::SeqCst), 0);
                sleep(Duration::from_millis(1)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(i)
            }
        })
        .await;

        assert_eq!(results.unwrap(), [0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_first_error_aborts() {
        let calls = Arc::new(AtomicUsize::new(0));

        let results: Result<Vec<usize>, String> = fan_out(0..10, 1, |i| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if i == 3 { Err(format!("item {i}")) } else { Ok(i) }
            }
        })
        .await;

        assert_eq!(results.unwrap_err(), "item 3");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
