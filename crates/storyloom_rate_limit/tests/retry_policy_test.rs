use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use storyloom_error::{ModelError, ModelErrorKind};
use storyloom_rate_limit::{RetryConfig, RetryPolicy};

fn transient() -> ModelError {
    ModelError::new(ModelErrorKind::Api {
        status_code: Some(503),
        message: "overloaded".to_string(),
        retryable: true,
    })
}

fn quick_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(RetryConfig::new(max_attempts, 10, 2.0, 100, false))
}

#[tokio::test(start_paused = true)]
async fn retries_transient_errors_until_success() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    let result = quick_policy(4)
        .execute(|| {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(transient())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_max_attempts() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    let result: Result<(), ModelError> = quick_policy(3)
        .execute(|| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn empty_response_is_not_retried() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    let result: Result<(), ModelError> = quick_policy(5)
        .execute(|| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ModelError::new(ModelErrorKind::EmptyResponse))
            }
        })
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.kind, ModelErrorKind::EmptyResponse);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn longer_retry_after_overrides_backoff() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let started = tokio::time::Instant::now();

    let result = quick_policy(2)
        .execute(|| {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ModelError::new(ModelErrorKind::RateLimited {
                        retry_after_ms: Some(7_000),
                        message: "slow down".to_string(),
                    }))
                } else {
                    Ok(())
                }
            }
        })
        .await;

    assert!(result.is_ok());
    assert!(started.elapsed() >= Duration::from_millis(7_000));
}

#[test]
fn config_defaults_and_validation() {
    let config: RetryConfig = toml::from_str("max_attempts = 6").unwrap();
    assert_eq!(*config.max_attempts(), 6);
    assert_eq!(*config.initial_delay_ms(), 1000);
    assert!(config.validate().is_ok());

    assert!(RetryConfig::new(0, 10, 2.0, 100, true).validate().is_err());
    assert!(RetryConfig::new(3, 10, 0.5, 100, true).validate().is_err());
    assert!(RetryConfig::new(3, 1000, 2.0, 100, true).validate().is_err());
}
