use crate::error::AppError;
use std::future::Future;
use tracing::{info, warn};

/// Runs `attempt` once per entry of the temperature ladder, in order,
/// returning the first success. The ladder length is the retry bound; there is
/// no backoff because the parameter variation itself is the point of each
/// retry. After exhaustion the last error is returned for the caller to
/// convert into its own terminal error.
///
/// The closure receives the attempt index alongside the temperature so
/// implementations can apply last-attempt salvage rules.
pub async fn with_temperatures<T, F, Fut>(
    temperatures: &[f32],
    mut attempt: F,
) -> Result<T, AppError>
where
    F: FnMut(usize, f32) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let total = temperatures.len();
    let mut last_error: Option<AppError> = None;

    for (index, &temperature) in temperatures.iter().enumerate() {
        match attempt(index, temperature).await {
            Ok(value) => {
                if index > 0 {
                    info!("Attempt {}/{} succeeded (temperature {})", index + 1, total, temperature);
                }
                return Ok(value);
            }
            Err(e) => {
                warn!(
                    "Attempt {}/{} failed (temperature {}): {}",
                    index + 1,
                    total,
                    temperature,
                    e
                );
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| AppError::Config("retry ladder is empty".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_success_stops_the_ladder() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = with_temperatures(&[0.7, 0.5, 0.3, 0.9], |index, _t| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if index == 1 {
                    Ok(42)
                } else {
                    Err(AppError::Upstream("boom".to_string()))
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: Result<i32, AppError> = with_temperatures(&[0.7, 0.5, 0.3, 0.9], |index, _t| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AppError::Upstream(format!("attempt {}", index)))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result {
            Err(AppError::Upstream(msg)) => assert_eq!(msg, "attempt 3"),
            other => panic!("Expected Upstream, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_attempt_index_and_temperature_line_up() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();

        let _: Result<(), AppError> = with_temperatures(&[0.7, 0.5], |index, t| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push((index, t));
                Err(AppError::Upstream("no".to_string()))
            }
        })
        .await;

        assert_eq!(*seen.lock().unwrap(), vec![(0, 0.7), (1, 0.5)]);
    }
}
