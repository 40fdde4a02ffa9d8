// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory session state: user identity, tags, breadcrumbs, custom data.
//!
//! All mutation goes through the operations here; external collaborators only
//! ever receive copies, never live references. After each mutation the
//! optional native mirror is notified; a mirror failure is logged and never
//! rolls back the in-memory change.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::warn;

use lantern_core::{Breadcrumb, BreadcrumbOptions, UserIdentity, UserInput};

use crate::clock::Clock;
use crate::device::{anonymous_identity, DeviceInfo};
use crate::error::Result;

/// Maximum number of breadcrumbs to keep.
pub const MAX_BREADCRUMBS: usize = 100;

/// Native-side mirror of the session state.
///
/// The host may keep a native crash reporter in sync with the in-process
/// session. Every call is best-effort; failures never affect the in-memory
/// record.
#[async_trait::async_trait]
pub trait NativeMirror: Send + Sync {
	async fn init(&self, api_key: &str) -> Result<()>;
	async fn set_tags(&self, tags: &[String]) -> Result<()>;
	async fn set_user(&self, user: &UserIdentity) -> Result<()>;
	async fn set_custom_data(&self, data: &Map<String, Value>) -> Result<()>;
	async fn record_breadcrumb(&self, breadcrumb: &Breadcrumb) -> Result<()>;
	async fn clear_session(&self) -> Result<()>;
	async fn send_crash_report(&self, report_json: &str, api_key: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
struct SessionRecord {
	user: UserIdentity,
	tags: Vec<String>,
	custom_data: Map<String, Value>,
	breadcrumbs: Vec<Breadcrumb>,
}

/// Immutable copy of the session handed to payload builders.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
	pub user: UserIdentity,
	pub tags: Vec<String>,
	pub custom_data: Map<String, Value>,
	pub breadcrumbs: Vec<Breadcrumb>,
}

/// The single mutable record of the current logical user session.
pub struct SessionState {
	record: RwLock<SessionRecord>,
	device: Arc<dyn DeviceInfo>,
	clock: Arc<dyn Clock>,
	mirror: Option<Arc<dyn NativeMirror>>,
	max_breadcrumbs: usize,
}

impl SessionState {
	/// Creates a fresh session with a generated anonymous identity.
	pub fn new(
		device: Arc<dyn DeviceInfo>,
		clock: Arc<dyn Clock>,
		mirror: Option<Arc<dyn NativeMirror>>,
		max_breadcrumbs: usize,
	) -> Self {
		let user = anonymous_identity(device.as_ref());
		Self {
			record: RwLock::new(SessionRecord {
				user,
				tags: Vec::new(),
				custom_data: Map::new(),
				breadcrumbs: Vec::new(),
			}),
			device,
			clock,
			mirror,
			max_breadcrumbs,
		}
	}

	/// Adds tags, preserving insertion order and dropping duplicates.
	pub async fn add_tags<I>(&self, tags: I)
	where
		I: IntoIterator<Item = String>,
	{
		let snapshot = {
			let mut record = self.record.write().await;
			for tag in tags {
				if !record.tags.contains(&tag) {
					record.tags.push(tag);
				}
			}
			record.tags.clone()
		};

		if let Some(mirror) = &self.mirror {
			if let Err(e) = mirror.set_tags(&snapshot).await {
				warn!(error = %e, "Failed to mirror tags to native side");
			}
		}
	}

	/// Replaces the session user.
	///
	/// Accepts either a full identity record or a bare identifier string; an
	/// empty identifier maps to the anonymous device-derived identity.
	pub async fn set_user(&self, input: impl Into<UserInput>) {
		let user = input
			.into()
			.resolve(anonymous_identity(self.device.as_ref()));

		let snapshot = {
			let mut record = self.record.write().await;
			record.user = user;
			record.user.clone()
		};

		if let Some(mirror) = &self.mirror {
			if let Err(e) = mirror.set_user(&snapshot).await {
				warn!(error = %e, "Failed to mirror user to native side");
			}
		}
	}

	/// Merges entries into the custom-data map (shallow overwrite).
	pub async fn add_custom_data(&self, partial: Map<String, Value>) {
		let snapshot = {
			let mut record = self.record.write().await;
			for (key, value) in partial {
				record.custom_data.insert(key, value);
			}
			record.custom_data.clone()
		};

		self.mirror_custom_data(&snapshot).await;
	}

	/// Replaces the custom-data map via an updater function.
	pub async fn replace_custom_data<F>(&self, updater: F)
	where
		F: FnOnce(Map<String, Value>) -> Map<String, Value>,
	{
		let snapshot = {
			let mut record = self.record.write().await;
			let current = std::mem::take(&mut record.custom_data);
			record.custom_data = updater(current);
			record.custom_data.clone()
		};

		self.mirror_custom_data(&snapshot).await;
	}

	/// Appends a breadcrumb stamped at the current time.
	///
	/// Options override the category/level/custom-data defaults but never the
	/// timestamp. The trail is capped; oldest entries are trimmed first.
	pub async fn record_breadcrumb(&self, message: impl Into<String>, options: BreadcrumbOptions) {
		let breadcrumb = Breadcrumb::new(message, options, self.clock.now());

		{
			let mut record = self.record.write().await;
			record.breadcrumbs.push(breadcrumb.clone());
			while record.breadcrumbs.len() > self.max_breadcrumbs {
				record.breadcrumbs.remove(0);
			}
		}

		if let Some(mirror) = &self.mirror {
			if let Err(e) = mirror.record_breadcrumb(&breadcrumb).await {
				warn!(error = %e, "Failed to mirror breadcrumb to native side");
			}
		}
	}

	/// Discards user, tags, custom data, and breadcrumbs, regenerating the
	/// anonymous identity.
	pub async fn clear_session(&self) {
		{
			let mut record = self.record.write().await;
			record.user = anonymous_identity(self.device.as_ref());
			record.tags.clear();
			record.custom_data.clear();
			record.breadcrumbs.clear();
		}

		if let Some(mirror) = &self.mirror {
			if let Err(e) = mirror.clear_session().await {
				warn!(error = %e, "Failed to mirror session clear to native side");
			}
		}
	}

	/// Returns a copy of the current user.
	pub async fn current_user(&self) -> UserIdentity {
		self.record.read().await.user.clone()
	}

	/// Returns a copy of the current tags.
	pub async fn current_tags(&self) -> Vec<String> {
		self.record.read().await.tags.clone()
	}

	/// Returns a full copy of the session for payload construction.
	pub async fn snapshot(&self) -> SessionSnapshot {
		let record = self.record.read().await;
		SessionSnapshot {
			user: record.user.clone(),
			tags: record.tags.clone(),
			custom_data: record.custom_data.clone(),
			breadcrumbs: record.breadcrumbs.clone(),
		}
	}

	async fn mirror_custom_data(&self, snapshot: &Map<String, Value>) {
		if let Some(mirror) = &self.mirror {
			if let Err(e) = mirror.set_custom_data(snapshot).await {
				warn!(error = %e, "Failed to mirror custom data to native side");
			}
		}
	}
}
