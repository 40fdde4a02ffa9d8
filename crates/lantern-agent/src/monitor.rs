// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Real-user-monitoring event transmission and session rotation.
//!
//! The monitor owns the RUM session id lifecycle. A session moves from
//! unstarted, to active, to expired once 30 minutes pass without an
//! interaction; expiry is detected lazily on the next transmit attempt, never
//! by a background timer, so a session with zero subsequent events stays open
//! indefinitely.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use lantern_core::{
	encode_timing_data, EventEnvelope, RumEvent, RumEventType, RumSessionId, TimingEntry,
	TimingInfo, TimingType, VERSION_NOT_SUPPLIED,
};

use crate::clock::Clock;
use crate::device::DeviceInfo;
use crate::session::SessionState;
use crate::transport::Transport;

/// Idle time after which a RUM session is considered expired.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::minutes(30);

struct RumSession {
	session_id: Option<RumSessionId>,
	last_interaction: DateTime<Utc>,
}

enum Rotation {
	/// No session existed yet; a fresh id was generated.
	Started,
	/// The previous session expired; End must go out under the old id first.
	Rotated { old: RumSessionId },
	/// Session still active; idle clock was reset.
	None,
}

/// Builds and transmits RUM events, rotating the session id as needed.
///
/// Transmission is fire-and-forget with respect to the caller: failures are
/// logged and swallowed, and the returned future is only an awaitable handle
/// for sequencing and tests.
pub struct RealUserMonitor {
	session: Arc<SessionState>,
	device: Arc<dyn DeviceInfo>,
	transport: Arc<dyn Transport>,
	clock: Arc<dyn Clock>,
	state: Mutex<RumSession>,
	endpoint: String,
	api_key: String,
	app_version: Option<String>,
}

impl RealUserMonitor {
	pub fn new(
		session: Arc<SessionState>,
		device: Arc<dyn DeviceInfo>,
		transport: Arc<dyn Transport>,
		clock: Arc<dyn Clock>,
		endpoint: String,
		api_key: String,
		app_version: Option<String>,
	) -> Self {
		let now = clock.now();
		Self {
			session,
			device,
			transport,
			clock,
			state: Mutex::new(RumSession {
				session_id: None,
				last_interaction: now,
			}),
			endpoint,
			api_key,
			app_version,
		}
	}

	/// The RUM collection endpoint this monitor posts to.
	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	/// The current session id, if a session has started.
	pub async fn session_id(&self) -> Option<String> {
		self.state
			.lock()
			.await
			.session_id
			.as_ref()
			.map(|id| id.to_string())
	}

	/// Resets the idle clock without rotating.
	pub async fn mark_interaction(&self) {
		let mut state = self.state.lock().await;
		state.last_interaction = self.clock.now();
	}

	/// Forces an End→Start rotation regardless of idle time.
	///
	/// Intended for explicit identity-change triggers. Policy for the caller
	/// wiring those signals: an anonymous user logging in should NOT rotate;
	/// a switch between identified users, or a logout back to anonymous,
	/// should.
	pub async fn rotate(&self) {
		let now = self.clock.now();
		let (old, new) = {
			let mut state = self.state.lock().await;
			let old = state.session_id.take();
			let new = RumSessionId::generate();
			state.session_id = Some(new.clone());
			state.last_interaction = now;
			(old, new)
		};

		if let Some(old) = old {
			self.send_lifecycle(RumEventType::SessionEnd, &old, now).await;
		}
		self.send_lifecycle(RumEventType::SessionStart, &new, now).await;
	}

	/// Transmits one timing event, rotating the session first if needed.
	///
	/// Ordering within a rotation is enforced by sequential await: SessionEnd
	/// is fully attempted under the old id before SessionStart is constructed
	/// under the new one, and SessionStart before the triggering event.
	/// Network delivery order alone would not guarantee this.
	pub async fn transmit(
		&self,
		timing_type: TimingType,
		name: &str,
		duration: u64,
		occurred_at: Option<DateTime<Utc>>,
	) {
		let now = self.clock.now();

		let (rotation, session_id) = {
			let mut state = self.state.lock().await;
			match state.session_id.clone() {
				None => {
					let id = RumSessionId::generate();
					state.session_id = Some(id.clone());
					state.last_interaction = now;
					(Rotation::Started, id)
				}
				Some(old) if now - state.last_interaction > SESSION_IDLE_TIMEOUT => {
					let id = RumSessionId::generate();
					state.session_id = Some(id.clone());
					state.last_interaction = now;
					(Rotation::Rotated { old }, id)
				}
				Some(id) => {
					state.last_interaction = now;
					(Rotation::None, id)
				}
			}
		};

		match rotation {
			Rotation::Rotated { old } => {
				debug!(old = %old, new = %session_id, "RUM session expired, rotating");
				self.send_lifecycle(RumEventType::SessionEnd, &old, now).await;
				self.send_lifecycle(RumEventType::SessionStart, &session_id, now)
					.await;
			}
			Rotation::Started => {
				debug!(session_id = %session_id, "Starting RUM session");
				self.send_lifecycle(RumEventType::SessionStart, &session_id, now)
					.await;
			}
			Rotation::None => {}
		}

		let entries = vec![TimingEntry {
			name: name.to_string(),
			timing: TimingInfo {
				timing_type,
				duration,
			},
		}];
		self.send_event(
			RumEventType::Timing,
			&session_id,
			occurred_at.unwrap_or(now),
			&entries,
		)
		.await;
	}

	/// Convenience dispatcher for caller-measured timings.
	///
	/// `ViewLoaded` treats `duration` as an already-elapsed time stamped now;
	/// `NetworkCall` synthesizes the start time as `now - duration`.
	pub async fn send_custom_event(&self, timing_type: TimingType, name: &str, duration: u64) {
		let occurred_at = match timing_type {
			TimingType::ViewLoaded => None,
			TimingType::NetworkCall => {
				Some(self.clock.now() - Duration::milliseconds(duration as i64))
			}
		};
		self.transmit(timing_type, name, duration, occurred_at).await;
	}

	async fn send_lifecycle(
		&self,
		event_type: RumEventType,
		session_id: &RumSessionId,
		occurred_at: DateTime<Utc>,
	) {
		self.send_event(event_type, session_id, occurred_at, &[]).await;
	}

	async fn send_event(
		&self,
		event_type: RumEventType,
		session_id: &RumSessionId,
		occurred_at: DateTime<Utc>,
		entries: &[TimingEntry],
	) {
		let event = RumEvent {
			event_type,
			timestamp: occurred_at,
			tags: self.session.current_tags().await,
			user: self.session.current_user().await,
			session_id: session_id.to_string(),
			version: self
				.app_version
				.clone()
				.unwrap_or_else(|| VERSION_NOT_SUPPLIED.to_string()),
			os: self.device.platform_os(),
			os_version: self.device.os_version(),
			platform: self.device.platform(),
			data: encode_timing_data(entries),
		};

		let envelope = EventEnvelope::single(event);
		let body = match serde_json::to_value(&envelope) {
			Ok(body) => body,
			Err(e) => {
				warn!(error = %e, "Failed to serialize RUM event");
				return;
			}
		};

		// RUM is lossy by design: failures are logged and the event dropped.
		if let Err(e) = self.transport.post(&self.endpoint, &self.api_key, &body).await {
			warn!(error = %e, event_type = %event_type, "Failed to deliver RUM event");
		}
	}
}
