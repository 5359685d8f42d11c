// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Retry utilities with exponential backoff for tracker API calls.
///
/// Page requests against the issue tracker are retried with growing delays so
/// a transient rate limit does not abort a whole load.
use std::{fmt::Display, time::Duration};

use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone, PartialEq,)]
pub struct RetryConfig
{
    /// Maximum number of attempts including the first one (default: 3).
    pub max_attempts:     u32,
    /// Delay before the second attempt in milliseconds (default: 1000).
    pub initial_delay_ms: u64,
    /// Multiplier applied after every failed attempt (default: 2.0).
    pub backoff_factor:   f64,
    /// Upper bound for a single delay in milliseconds (default: 30000).
    pub max_delay_ms:     u64,
}

impl Default for RetryConfig
{
    fn default() -> Self
    {
        Self {
            max_attempts: 3, initial_delay_ms: 1000, backoff_factor: 2.0, max_delay_ms: 30_000,
        }
    }
}

impl RetryConfig
{
    /// Delay to wait after the failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32,) -> Duration
    {
        let exponent = attempt.saturating_sub(1,).min(i32::MAX as u32,) as i32;
        let scaled = self.initial_delay_ms as f64 * self.backoff_factor.powi(exponent,);
        let capped = scaled.min(self.max_delay_ms as f64,).max(0.0,);
        Duration::from_millis(capped as u64,)
    }
}

/// Executes an async operation, retrying failures with exponential backoff.
///
/// # Arguments
///
/// * `config` - Retry configuration (max attempts, delays)
/// * `operation_name` - Name of the operation for logging
/// * `f` - Async function to retry
///
/// # Errors
///
/// Returns the last error encountered if all attempts fail.
pub async fn retry_with_backoff<F, Fut, T, E,>(
    config: &RetryConfig,
    operation_name: &str,
    mut f: F,
) -> Result<T, E,>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E,>,>,
    E: Display,
{
    let mut attempt = 1;

    loop {
        match f().await {
            Ok(result,) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result,);
            }
            Err(error,) => {
                if attempt >= config.max_attempts {
                    warn!("{} failed after {} attempts: {}", operation_name, attempt, error);
                    return Err(error,);
                }

                let delay = config.delay_after(attempt,);
                warn!(
                    "{} failed on attempt {}/{}: {}. Retrying in {}ms...",
                    operation_name,
                    attempt,
                    config.max_attempts,
                    error,
                    delay.as_millis()
                );

                sleep(delay,).await;
                attempt += 1;
            }
        }
    }
}
