// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! View-load timing correlation.
//!
//! Pairs "view begins loading" and "view finished loading" signals into one
//! timed ViewLoaded event per load, keyed by view name.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::debug;

use lantern_core::TimingType;

use crate::monitor::RealUserMonitor;

/// Pairs view-load lifecycle signals into timed ViewLoaded events.
pub struct ViewCorrelator {
	monitor: Arc<RealUserMonitor>,
	pending: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl ViewCorrelator {
	pub fn new(monitor: Arc<RealUserMonitor>) -> Self {
		Self {
			monitor,
			pending: Mutex::new(HashMap::new()),
		}
	}

	/// Records the start of a view load.
	///
	/// A duplicate signal for a name already pending is ignored; the original
	/// start time is kept.
	pub fn view_begins_loading(&self, view_name: &str, time: DateTime<Utc>) {
		let mut pending = self.pending.lock().expect("pending-view lock poisoned");
		if pending.contains_key(view_name) {
			debug!(view = %view_name, "View load already pending, keeping original start");
			return;
		}
		pending.insert(view_name.to_string(), time);
	}

	/// Completes a view load, emitting one ViewLoaded event.
	///
	/// A finish with no matching pending start is a benign race and emits
	/// nothing.
	pub async fn view_finishes_loading(&self, view_name: &str, time: DateTime<Utc>) {
		let start = {
			let mut pending = self.pending.lock().expect("pending-view lock poisoned");
			pending.remove(view_name)
		};

		let Some(start) = start else {
			debug!(view = %view_name, "View finished without a pending start, ignoring");
			return;
		};

		let duration = (time - start).num_milliseconds().max(0) as u64;
		let name = normalize_view_name(view_name);
		self.monitor
			.transmit(TimingType::ViewLoaded, &name, duration, None)
			.await;
	}

	/// Number of views currently loading.
	pub fn pending_len(&self) -> usize {
		self.pending
			.lock()
			.expect("pending-view lock poisoned")
			.len()
	}
}

/// Normalizes a platform-reported view name for display.
///
/// Unwraps the `Optional("...")` wrapper some platforms report controller
/// names with, and drops a single trailing dot-qualified segment when one is
/// present after the wrapper is removed.
pub fn normalize_view_name(raw: &str) -> String {
	let mut name = raw.trim();

	if let Some(inner) = name
		.strip_prefix("Optional(\"")
		.and_then(|rest| rest.strip_suffix("\")"))
	{
		name = inner;
	}

	match name.rsplit_once('.') {
		Some((head, _)) if !head.is_empty() => head.to_string(),
		_ => name.to_string(),
	}
}
