//! Retry logic for connection establishment.
//!
//! Only the connect path retries. Writes are never wrapped in
//! [`with_retry`], since repeating a command the device may already have
//! applied could toggle it twice.
//!
//! # Example
//!
//! ```
//! use govee_core::{RetryConfig, with_retry, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! let config = RetryConfig::for_connect();
//!
//! let result = with_retry(&config, "connect", || async {
//!     Ok::<_, Error>(42)
//! }).await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{Error, Result, UnreachableReason};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 means no retries).
    pub max_retries: u32,
    /// Initial delay between retries.
    pub initial_delay: Duration,
    /// Maximum delay between retries (for exponential backoff).
    pub max_delay: Duration,
    /// Backoff multiplier (1.0 = constant delay, 2.0 = double each time).
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::for_connect()
    }
}

impl RetryConfig {
    /// Create a new retry config with custom settings.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// No retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Retry configuration for establishing a BLE connection.
    ///
    /// Lights that were just powered or are busy with another central need a
    /// moment before they accept a connection, so delays start at one second.
    pub fn for_connect() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Minimal retries with short delays, for interactive use.
    pub fn quick() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    /// Set maximum number of retries.
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set initial delay.
    #[must_use]
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum delay.
    #[must_use]
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set backoff multiplier.
    #[must_use]
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enable or disable jitter.
    #[must_use]
    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    /// Total attempts including the first one.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Check the settings are usable.
    pub fn validate(&self) -> Result<()> {
        if self.backoff_multiplier < 1.0 {
            return Err(Error::invalid_config("backoff_multiplier must be >= 1.0"));
        }
        if self.max_delay < self.initial_delay {
            return Err(Error::invalid_config("max_delay must be >= initial_delay"));
        }
        Ok(())
    }

    /// Calculate delay for a given attempt number.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay =
            self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay.as_secs_f64());

        let final_delay = if self.jitter {
            // Up to 25% extra
            let jitter_factor = 1.0 + (rand::rng().random::<f64>() * 0.25);
            capped_delay * jitter_factor
        } else {
            capped_delay
        };

        // Near Duration::MAX the f64 product no longer fits
        Duration::try_from_secs_f64(final_delay).unwrap_or(self.max_delay)
    }
}

/// Execute an async operation with retry logic.
///
/// Non-retryable errors are returned immediately. When every attempt fails
/// with a retryable error, the result is
/// [`UnreachableReason::RetriesExhausted`] carrying the last error.
pub async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("{} succeeded after {} retries", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(e) => {
                if !is_retryable(&e) {
                    return Err(e);
                }

                if attempt < config.max_retries {
                    let delay = config.delay_for_attempt(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        operation_name,
                        attempt + 1,
                        config.total_attempts(),
                        e,
                        delay
                    );
                    sleep(delay).await;
                }

                last_error = Some(e);
            }
        }
    }

    let last_error = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no attempt was made".to_string());
    warn!(
        "{} gave up after {} attempt(s)",
        operation_name,
        config.total_attempts()
    );
    Err(Error::DeviceUnreachable(UnreachableReason::RetriesExhausted {
        attempts: config.total_attempts(),
        last_error,
    }))
}

/// Check if an error is worth another connection attempt.
pub fn is_retryable(error: &Error) -> bool {
    match error {
        Error::Bluetooth(_) => true,
        Error::ConnectionFailed { .. } => true,
        Error::Timeout { .. } => true,
        Error::Io(_) => true,
        // Discovery outcomes and exhausted budgets are final
        Error::DeviceUnreachable(_) => false,
        // Never repeat a write
        Error::WriteFailed { .. } => false,
        Error::Frame(_) => false,
        Error::CharacteristicNotFound { .. } => false,
        Error::InvalidConfig(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_retries: u32) -> RetryConfig {
        RetryConfig::new(max_retries)
            .initial_delay(Duration::from_millis(1))
            .max_delay(Duration::from_millis(5))
            .jitter(false)
    }

    #[test]
    fn test_retry_config_default_is_connect_preset() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert!(config.jitter);
    }

    #[test]
    fn test_retry_config_none() {
        let config = RetryConfig::none();
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.total_attempts(), 1);
    }

    #[test]
    fn test_delay_calculation() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(400),
            jitter: false,
            max_retries: 5,
        };

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(6), Duration::from_millis(400));
    }

    #[test]
    fn test_jitter_stays_within_quarter() {
        let config = RetryConfig::new(1)
            .initial_delay(Duration::from_millis(400))
            .max_delay(Duration::from_secs(1));
        for _ in 0..20 {
            let delay = config.delay_for_attempt(0);
            assert!(delay >= Duration::from_millis(400));
            assert!(delay <= Duration::from_millis(500));
        }
    }

    #[test]
    fn test_unbounded_max_delay_does_not_overflow() {
        for jitter in [true, false] {
            let config = RetryConfig::new(1000)
                .max_delay(Duration::MAX)
                .jitter(jitter);
            assert!(config.validate().is_ok());
            for attempt in [10, 64, 200, 1000] {
                let delay = config.delay_for_attempt(attempt);
                assert!(delay >= config.initial_delay);
            }
            assert_eq!(config.delay_for_attempt(1000), Duration::MAX);
        }
    }

    #[test]
    fn test_validate() {
        assert!(RetryConfig::default().validate().is_ok());
        assert!(
            RetryConfig::default()
                .backoff_multiplier(0.5)
                .validate()
                .is_err()
        );
        assert!(
            RetryConfig::default()
                .max_delay(Duration::from_millis(1))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(is_retryable(&Error::timeout("connect", Duration::from_secs(1))));
        assert!(is_retryable(&Error::connection_failed(None, "busy")));
        assert!(!is_retryable(&Error::write_failed("uuid", "dropped")));
        assert!(!is_retryable(&Error::no_scanner()));
        assert!(!is_retryable(&Error::not_advertising("AA")));
        assert!(!is_retryable(&Error::Frame(
            govee_types::FrameError::InvalidCommand(0x100)
        )));
    }

    #[tokio::test]
    async fn test_with_retry_immediate_success() {
        let result = with_retry(&fast(3), "test", || async { Ok::<_, Error>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_retry_eventual_success() {
        let attempts = Arc::new(AtomicU32::new(0));

        let result: Result<i32> = with_retry(&fast(3), "test", || {
            let attempts = Arc::clone(&attempts);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(Error::connection_failed(None, "transient"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_exhaustion_reports_unreachable() {
        let attempts = Arc::new(AtomicU32::new(0));

        let result: Result<i32> = with_retry(&fast(2), "test", || {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(Error::connection_failed(None, "persistent"))
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        match result {
            Err(Error::DeviceUnreachable(UnreachableReason::RetriesExhausted {
                attempts,
                last_error,
            })) => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("persistent"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_with_retry_non_retryable_error() {
        let attempts = Arc::new(AtomicU32::new(0));

        let result: Result<i32> = with_retry(&fast(3), "test", || {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(Error::not_advertising("AA:BB"))
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(Error::DeviceUnreachable(UnreachableReason::NotAdvertising { .. }))
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn delay_never_exceeds_jittered_cap(
            initial_ms in 1u64..2_000,
            extra_ms in 0u64..20_000,
            multiplier in 1.0f64..4.0,
            attempt in 0u32..32,
        ) {
            let config = RetryConfig::new(5)
                .initial_delay(Duration::from_millis(initial_ms))
                .max_delay(Duration::from_millis(initial_ms + extra_ms))
                .backoff_multiplier(multiplier);

            let delay = config.delay_for_attempt(attempt);
            let cap = config.max_delay.as_secs_f64() * 1.25 + 1e-6;
            prop_assert!(delay.as_secs_f64() <= cap);
            prop_assert!(delay.as_secs_f64() + 1e-6 >= config.initial_delay.as_secs_f64());
        }
    }
}
