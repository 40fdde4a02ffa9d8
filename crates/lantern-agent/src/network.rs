// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Network-activity correlation.
//!
//! The host's interception layer supplies raw open/send/response callbacks;
//! this module pairs them into a single timed NetworkCall event per request,
//! keyed by a correlation id handed out at open time. No fields are ever
//! attached to externally-owned call objects.
//!
//! Known limitation: a response that never arrives leaves that correlation
//! entry pending for the lifetime of the process. There is no timeout.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use lantern_core::TimingType;

use crate::clock::Clock;
use crate::monitor::RealUserMonitor;

/// URL substrings excluded from monitoring regardless of configuration.
///
/// Covers the collection host and the local development bundler, whose
/// traffic is never interesting to a session timeline.
pub const DEFAULT_IGNORED_URLS: &[&str] = &["ingest.lantern.dev", "localhost:8081"];

/// Opaque token linking one request's open/send/response callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(u64);

impl std::fmt::Display for CorrelationId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[derive(Debug)]
struct RequestMeta {
	name: String,
	send_time: Option<DateTime<Utc>>,
}

/// Pairs raw request callbacks into timed NetworkCall events.
pub struct NetworkCorrelator {
	monitor: Arc<RealUserMonitor>,
	clock: Arc<dyn Clock>,
	pending: Mutex<HashMap<CorrelationId, RequestMeta>>,
	next_id: AtomicU64,
	ignored_urls: Vec<String>,
}

impl NetworkCorrelator {
	/// Creates a correlator.
	///
	/// The effective ignore list merges [`DEFAULT_IGNORED_URLS`], the
	/// caller-supplied patterns, and the agent's own collection endpoints;
	/// matching is by substring, and a matching URL produces no correlation
	/// id and no event. The agent's endpoints are always included so it never
	/// monitors its own telemetry traffic.
	pub fn new(
		monitor: Arc<RealUserMonitor>,
		clock: Arc<dyn Clock>,
		ignored_urls: Vec<String>,
	) -> Self {
		let mut ignored_urls: Vec<String> = DEFAULT_IGNORED_URLS
			.iter()
			.map(|s| s.to_string())
			.chain(ignored_urls)
			.collect();
		ignored_urls.push(monitor.endpoint().to_string());
		Self {
			monitor,
			clock,
			pending: Mutex::new(HashMap::new()),
			next_id: AtomicU64::new(1),
			ignored_urls,
		}
	}

	/// Returns true if requests to `url` are excluded from monitoring.
	pub fn should_ignore(&self, url: &str) -> bool {
		self.ignored_urls.iter().any(|pattern| url.contains(pattern))
	}

	/// Handles a request being opened.
	///
	/// Returns the correlation id the host must carry through to the send and
	/// response callbacks, or `None` when the URL is ignored.
	pub fn on_open(&self, http_method: &str, url: &str) -> Option<CorrelationId> {
		if self.should_ignore(url) {
			debug!(url = %url, "Ignoring request to excluded URL");
			return None;
		}

		let id = CorrelationId(self.next_id.fetch_add(1, Ordering::Relaxed));
		let meta = RequestMeta {
			name: format!("{http_method} {url}"),
			send_time: None,
		};
		self.pending
			.lock()
			.expect("pending-request lock poisoned")
			.insert(id, meta);
		Some(id)
	}

	/// Stamps the send time for an in-flight request. No-op for unknown ids.
	pub fn on_send(&self, id: CorrelationId) {
		let mut pending = self.pending.lock().expect("pending-request lock poisoned");
		match pending.get_mut(&id) {
			Some(meta) => meta.send_time = Some(self.clock.now()),
			None => debug!(id = %id, "Send callback for unknown correlation id"),
		}
	}

	/// Completes a request, emitting one NetworkCall event.
	///
	/// The entry is removed regardless of response status; an unknown id is a
	/// benign race and emits nothing.
	pub async fn on_response(&self, id: CorrelationId) {
		let meta = {
			let mut pending = self.pending.lock().expect("pending-request lock poisoned");
			pending.remove(&id)
		};

		let Some(meta) = meta else {
			debug!(id = %id, "Response callback for unknown correlation id");
			return;
		};

		let Some(send_time) = meta.send_time else {
			debug!(id = %id, name = %meta.name, "Response before send, dropping");
			return;
		};

		let duration = (self.clock.now() - send_time).num_milliseconds().max(0) as u64;
		self.monitor
			.transmit(TimingType::NetworkCall, &meta.name, duration, Some(send_time))
			.await;
	}

	/// Number of requests currently awaiting a response.
	pub fn pending_len(&self) -> usize {
		self.pending
			.lock()
			.expect("pending-request lock poisoned")
			.len()
	}
}
