use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Bounded exponential backoff for operations that may fail transiently.
///
/// The retried operation reports its outcome as a `Result` value; after each
/// failed attempt the calling worker thread sleeps `base_delay * 2^(n-1)`
/// before attempt `n+1`. The final failed attempt returns immediately.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        debug!(
            "Created RetryPolicy with max_attempts={}, base_delay={:?}",
            max_attempts, base_delay
        );
        Self {
            max_attempts,
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Runs `op` until it succeeds or `max_attempts` attempts are exhausted.
    ///
    /// Returns whether the operation eventually succeeded. The failure values
    /// themselves are only logged; the terminal outcome is what callers act on.
    pub fn run<E, F>(&self, description: impl Display, mut op: F) -> bool
    where
        E: Display,
        F: FnMut() -> Result<(), E>,
    {
        debug!("Executing operation with retry: {}", description);
        for attempt in 1..=self.max_attempts {
            match op() {
                Ok(()) => {
                    debug!("Operation succeeded: {}", description);
                    return true;
                }
                Err(e) => {
                    warn!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt, self.max_attempts, description, e
                    );
                    if attempt >= self.max_attempts {
                        error!(
                            "Failed to complete {} after {} attempts. Skipping...",
                            description, self.max_attempts
                        );
                        return false;
                    }
                    let delay = self.base_delay * 2u32.pow(attempt - 1);
                    debug!("Retrying {} in {:?}...", description, delay);
                    std::thread::sleep(delay);
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_succeeds_on_first_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_millis(5));
        let mut attempts = 0;
        let ok = policy.run("noop", || {
            attempts += 1;
            Ok::<(), String>(())
        });

        assert!(ok);
        assert_eq!(attempts, 1);
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1));
        let mut attempts = 0;
        let ok = policy.run("flaky", || {
            attempts += 1;
            if attempts < 3 {
                Err("transient".to_string())
            } else {
                Ok(())
            }
        });

        assert!(ok);
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_exhausts_all_attempts() {
        let policy = RetryPolicy::new(4, Duration::from_millis(1));
        let mut attempts = 0;
        let ok = policy.run("doomed", || {
            attempts += 1;
            Err::<(), _>("always fails")
        });

        assert!(!ok);
        assert_eq!(attempts, 4);
    }

    #[test]
    fn test_backoff_delays_double() {
        // 3 failed attempts sleep 10ms then 20ms; the last failure returns
        // immediately, so total elapsed must be at least 30ms.
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let start = Instant::now();
        let ok = policy.run("timed", || Err::<(), _>("fails"));

        assert!(!ok);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_single_attempt_never_sleeps() {
        let policy = RetryPolicy::new(1, Duration::from_secs(60));
        let start = Instant::now();
        let ok = policy.run("one-shot", || Err::<(), _>("fails"));

        assert!(!ok);
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
