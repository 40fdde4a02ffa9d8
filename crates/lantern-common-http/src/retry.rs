// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Retry with exponential backoff and jitter for transient HTTP failures.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Maximum number of attempts (including the first).
	pub max_attempts: u32,
	/// Backoff before the first retry.
	pub initial_backoff: Duration,
	/// Upper bound on any single backoff.
	pub max_backoff: Duration,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			initial_backoff: Duration::from_millis(500),
			max_backoff: Duration::from_secs(10),
		}
	}
}

/// Errors that can classify themselves as transient.
pub trait RetryableError {
	/// Returns true if the operation may succeed on retry.
	fn is_retryable(&self) -> bool;
}

impl RetryableError for reqwest::Error {
	fn is_retryable(&self) -> bool {
		self.is_timeout() || self.is_connect() || self.is_request()
	}
}

/// Runs `operation`, retrying retryable failures with exponential backoff.
///
/// Backoff doubles per attempt, capped at `max_backoff`, with up to 50%
/// random jitter added to avoid thundering-herd retries.
pub async fn retry<T, E, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
	E: RetryableError + std::fmt::Display,
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
{
	let mut backoff = config.initial_backoff;

	for attempt in 1..=config.max_attempts {
		match operation().await {
			Ok(value) => return Ok(value),
			Err(e) if attempt < config.max_attempts && e.is_retryable() => {
				let jitter = backoff.mul_f64(fastrand::f64() * 0.5);
				let delay = (backoff + jitter).min(config.max_backoff);
				debug!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "Retrying after transient failure");
				tokio::time::sleep(delay).await;
				backoff = (backoff * 2).min(config.max_backoff);
			}
			Err(e) => return Err(e),
		}
	}

	unreachable!("retry loop always returns within max_attempts")
}
