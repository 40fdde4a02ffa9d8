// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Injectable wall-clock source.
//!
//! Payload construction and idle-timeout detection read time through this
//! trait so tests can fix or advance it deterministically.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
	fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// A manually-controlled clock for deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
	now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
	pub fn new(start: DateTime<Utc>) -> Self {
		Self {
			now: Mutex::new(start),
		}
	}

	/// Moves the clock forward.
	pub fn advance(&self, by: Duration) {
		let mut now = self.now.lock().expect("clock lock poisoned");
		*now += by;
	}

	/// Sets the clock to an absolute time.
	pub fn set(&self, to: DateTime<Utc>) {
		*self.now.lock().expect("clock lock poisoned") = to;
	}
}

impl Clock for ManualClock {
	fn now(&self) -> DateTime<Utc> {
		*self.now.lock().expect("clock lock poisoned")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn manual_clock_advances() {
		let start = Utc::now();
		let clock = ManualClock::new(start);
		assert_eq!(clock.now(), start);

		clock.advance(Duration::minutes(31));
		assert_eq!(clock.now(), start + Duration::minutes(31));
	}

	#[test]
	fn manual_clock_sets_absolute_time() {
		let clock = ManualClock::new(Utc::now());
		let target = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
		clock.set(target);
		assert_eq!(clock.now(), target);
	}
}
