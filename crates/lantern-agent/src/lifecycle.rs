// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host lifecycle event fan-out.
//!
//! The host environment feeds application and view lifecycle signals into a
//! [`LifecycleHub`]; subscribers register async handlers and are deregistered
//! when their [`Subscription`] drops or the hub is destroyed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use tracing::debug;

/// A lifecycle signal from the host environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
	Start,
	Pause,
	Resume,
	ViewLoading {
		view_name: String,
		time: DateTime<Utc>,
	},
	ViewLoaded {
		view_name: String,
		time: DateTime<Utc>,
	},
	Destroy,
}

type Handler = Arc<dyn Fn(LifecycleEvent) -> BoxFuture<'static, ()> + Send + Sync>;

struct HubInner {
	handlers: Mutex<HashMap<u64, Handler>>,
	next_id: AtomicU64,
}

/// Fan-out point for host lifecycle signals.
///
/// Cheaply cloneable; clones share the subscriber set.
#[derive(Clone)]
pub struct LifecycleHub {
	inner: Arc<HubInner>,
}

impl Default for LifecycleHub {
	fn default() -> Self {
		Self::new()
	}
}

impl LifecycleHub {
	pub fn new() -> Self {
		Self {
			inner: Arc::new(HubInner {
				handlers: Mutex::new(HashMap::new()),
				next_id: AtomicU64::new(1),
			}),
		}
	}

	/// Registers an async handler for every subsequent event.
	///
	/// The handler stays registered until the returned [`Subscription`] is
	/// dropped or the hub sees [`LifecycleEvent::Destroy`].
	pub fn subscribe<F>(&self, handler: F) -> Subscription
	where
		F: Fn(LifecycleEvent) -> BoxFuture<'static, ()> + Send + Sync + 'static,
	{
		let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
		self.inner
			.handlers
			.lock()
			.expect("lifecycle handler lock poisoned")
			.insert(id, Arc::new(handler));
		Subscription {
			inner: self.inner.clone(),
			id,
		}
	}

	/// Dispatches an event to every registered handler, in turn.
	///
	/// `Destroy` is delivered to the handlers and then deregisters all of
	/// them; destroying an already-destroyed hub is a no-op.
	pub async fn emit(&self, event: LifecycleEvent) {
		let handlers: Vec<Handler> = {
			let handlers = self
				.inner
				.handlers
				.lock()
				.expect("lifecycle handler lock poisoned");
			handlers.values().cloned().collect()
		};

		if handlers.is_empty() {
			debug!(event = ?event, "Lifecycle event with no subscribers");
			return;
		}

		for handler in &handlers {
			handler(event.clone()).await;
		}

		if event == LifecycleEvent::Destroy {
			self.inner
				.handlers
				.lock()
				.expect("lifecycle handler lock poisoned")
				.clear();
		}
	}

	/// Number of registered handlers.
	pub fn subscriber_count(&self) -> usize {
		self.inner
			.handlers
			.lock()
			.expect("lifecycle handler lock poisoned")
			.len()
	}
}

/// Handle keeping one lifecycle handler registered.
pub struct Subscription {
	inner: Arc<HubInner>,
	id: u64,
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.inner
			.handlers
			.lock()
			.expect("lifecycle handler lock poisoned")
			.remove(&self.id);
	}
}
