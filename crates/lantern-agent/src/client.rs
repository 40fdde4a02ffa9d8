// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Agent client: the coordinator wiring session state, crash reporting, and
//! real-user monitoring together behind one handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use futures::FutureExt;
use lantern_common_http::{retry, RetryConfig};
use lantern_core::{BreadcrumbOptions, CrashReportPayload, FrameInput, RawError, UserInput};

use crate::clock::{Clock, SystemClock};
use crate::device::DeviceInfo;
use crate::error::{AgentError, Result};
use crate::lifecycle::{LifecycleEvent, LifecycleHub, Subscription};
use crate::monitor::RealUserMonitor;
use crate::network::NetworkCorrelator;
use crate::report::{build_crash_report, DefaultEnvironment, EnvironmentProvider};
use crate::session::{NativeMirror, SessionState, MAX_BREADCRUMBS};
use crate::transport::{
	CrashCache, HttpTransport, MemoryCrashCache, Transport, DEFAULT_CRASH_ENDPOINT,
	DEFAULT_RUM_ENDPOINT,
};
use crate::view::ViewCorrelator;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Delay before the first opportunistic flush of cached crash reports.
const CACHE_FLUSH_DELAY: Duration = Duration::from_secs(5);

/// Caller-supplied hook inspecting every crash payload before delivery.
///
/// The hook may replace the payload wholesale; returning `None` suppresses
/// the send entirely.
pub type BeforeSendHook =
	Arc<dyn Fn(CrashReportPayload) -> Option<CrashReportPayload> + Send + Sync>;

/// Builder for [`AgentClient`].
pub struct AgentClientBuilder {
	api_key: String,
	device: Option<Arc<dyn DeviceInfo>>,
	app_version: Option<String>,
	crash_endpoint: String,
	rum_endpoint: String,
	request_timeout: Duration,
	transport: Option<Arc<dyn Transport>>,
	crash_cache: Option<Arc<dyn CrashCache>>,
	mirror: Option<Arc<dyn NativeMirror>>,
	native_crash_reporting: bool,
	environment: Arc<dyn EnvironmentProvider>,
	before_send: Option<BeforeSendHook>,
	ignored_urls: Vec<String>,
	max_breadcrumbs: usize,
	clock: Arc<dyn Clock>,
	retry: RetryConfig,
}

impl AgentClientBuilder {
	fn new(api_key: impl Into<String>) -> Self {
		Self {
			api_key: api_key.into(),
			device: None,
			app_version: None,
			crash_endpoint: DEFAULT_CRASH_ENDPOINT.to_string(),
			rum_endpoint: DEFAULT_RUM_ENDPOINT.to_string(),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			transport: None,
			crash_cache: None,
			mirror: None,
			native_crash_reporting: false,
			environment: Arc::new(DefaultEnvironment),
			before_send: None,
			ignored_urls: Vec::new(),
			max_breadcrumbs: MAX_BREADCRUMBS,
			clock: Arc::new(SystemClock),
			retry: RetryConfig::default(),
		}
	}

	/// Device/platform info collaborator. Required.
	pub fn device(mut self, device: Arc<dyn DeviceInfo>) -> Self {
		self.device = Some(device);
		self
	}

	/// Application version embedded in crash and RUM payloads.
	pub fn app_version(mut self, version: impl Into<String>) -> Self {
		self.app_version = Some(version.into());
		self
	}

	/// Overrides the crash-report collection endpoint.
	pub fn crash_endpoint(mut self, url: impl Into<String>) -> Self {
		self.crash_endpoint = url.into();
		self
	}

	/// Overrides the RUM collection endpoint.
	pub fn rum_endpoint(mut self, url: impl Into<String>) -> Self {
		self.rum_endpoint = url.into();
		self
	}

	/// Per-request timeout for the default HTTP transport.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	/// Replaces the HTTP transport, e.g. with a recording one in tests.
	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Replaces the in-memory crash cache with a persistent one.
	pub fn crash_cache(mut self, cache: Arc<dyn CrashCache>) -> Self {
		self.crash_cache = Some(cache);
		self
	}

	/// Attaches a native-side session mirror.
	pub fn native_mirror(mut self, mirror: Arc<dyn NativeMirror>) -> Self {
		self.mirror = Some(mirror);
		self
	}

	/// Routes crash reports through the native mirror instead of direct POST.
	///
	/// Whether native-side capture is preferable is the host's decision; it is
	/// reported here as a plain flag. Requires a mirror to have any effect.
	pub fn native_crash_reporting(mut self, enabled: bool) -> Self {
		self.native_crash_reporting = enabled;
		self
	}

	/// Environment-metadata collaborator for crash payloads.
	pub fn environment(mut self, environment: Arc<dyn EnvironmentProvider>) -> Self {
		self.environment = environment;
		self
	}

	/// Hook run on every crash payload before delivery.
	pub fn before_send(mut self, hook: BeforeSendHook) -> Self {
		self.before_send = Some(hook);
		self
	}

	/// URL substrings excluded from network monitoring.
	pub fn ignored_urls<I, S>(mut self, patterns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.ignored_urls = patterns.into_iter().map(Into::into).collect();
		self
	}

	/// Caps the breadcrumb trail; oldest entries are trimmed first.
	pub fn max_breadcrumbs(mut self, max: usize) -> Self {
		self.max_breadcrumbs = max;
		self
	}

	/// Replaces the wall-clock source, for deterministic tests.
	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}

	/// Retry policy for crash-report delivery.
	pub fn retry_config(mut self, retry: RetryConfig) -> Self {
		self.retry = retry;
		self
	}

	/// Validates the configuration and starts the agent.
	///
	/// Initializes the native mirror when one is attached and schedules the
	/// first opportunistic flush of cached crash reports.
	pub async fn build(self) -> Result<AgentClient> {
		if self.api_key.trim().is_empty() {
			return Err(AgentError::MissingApiKey);
		}
		let device = self.device.ok_or(AgentError::MissingDeviceInfo)?;

		let transport: Arc<dyn Transport> = match self.transport {
			Some(transport) => transport,
			None => Arc::new(HttpTransport::new(self.request_timeout)?),
		};
		let crash_cache = self
			.crash_cache
			.unwrap_or_else(|| Arc::new(MemoryCrashCache::new()));

		let session = Arc::new(SessionState::new(
			device.clone(),
			self.clock.clone(),
			self.mirror.clone(),
			self.max_breadcrumbs,
		));
		let monitor = Arc::new(RealUserMonitor::new(
			session.clone(),
			device.clone(),
			transport.clone(),
			self.clock.clone(),
			self.rum_endpoint,
			self.api_key.clone(),
			self.app_version.clone(),
		));
		// The crash endpoint joins the ignore list here; the correlator adds
		// the RUM endpoint itself.
		let mut ignored_urls = self.ignored_urls;
		ignored_urls.push(self.crash_endpoint.clone());
		let network = Arc::new(NetworkCorrelator::new(
			monitor.clone(),
			self.clock.clone(),
			ignored_urls,
		));
		let views = Arc::new(ViewCorrelator::new(monitor.clone()));

		if let Some(mirror) = &self.mirror {
			if let Err(e) = mirror.init(&self.api_key).await {
				warn!(error = %e, "Native mirror initialization failed");
			}
		}

		let lifecycle = LifecycleHub::new();
		let subscription = {
			let views = views.clone();
			let monitor = monitor.clone();
			lifecycle.subscribe(move |event| {
				let views = views.clone();
				let monitor = monitor.clone();
				async move {
					match event {
						LifecycleEvent::ViewLoading { view_name, time } => {
							views.view_begins_loading(&view_name, time);
						}
						LifecycleEvent::ViewLoaded { view_name, time } => {
							views.view_finishes_loading(&view_name, time).await;
						}
						LifecycleEvent::Start | LifecycleEvent::Resume => {
							monitor.mark_interaction().await;
						}
						LifecycleEvent::Pause | LifecycleEvent::Destroy => {}
					}
				}
				.boxed()
			})
		};

		let inner = Arc::new(ClientInner {
			api_key: self.api_key,
			app_version: self.app_version,
			crash_endpoint: self.crash_endpoint,
			session,
			monitor,
			network,
			views,
			lifecycle,
			transport,
			crash_cache,
			mirror: self.mirror,
			native_crash_reporting: self.native_crash_reporting,
			environment: self.environment,
			before_send: self.before_send,
			clock: self.clock,
			retry: self.retry,
			shutdown: AtomicBool::new(false),
			subscription: Mutex::new(Some(subscription)),
		});

		{
			let inner = inner.clone();
			tokio::spawn(async move {
				tokio::time::sleep(CACHE_FLUSH_DELAY).await;
				inner.flush_crash_cache().await;
			});
		}

		info!("Telemetry agent initialized");
		Ok(AgentClient { inner })
	}
}

struct ClientInner {
	api_key: String,
	app_version: Option<String>,
	crash_endpoint: String,
	session: Arc<SessionState>,
	monitor: Arc<RealUserMonitor>,
	network: Arc<NetworkCorrelator>,
	views: Arc<ViewCorrelator>,
	lifecycle: LifecycleHub,
	transport: Arc<dyn Transport>,
	crash_cache: Arc<dyn CrashCache>,
	mirror: Option<Arc<dyn NativeMirror>>,
	native_crash_reporting: bool,
	environment: Arc<dyn EnvironmentProvider>,
	before_send: Option<BeforeSendHook>,
	clock: Arc<dyn Clock>,
	retry: RetryConfig,
	shutdown: AtomicBool,
	subscription: Mutex<Option<Subscription>>,
}

impl ClientInner {
	async fn flush_crash_cache(&self) {
		if let Err(e) = self
			.crash_cache
			.flush(&self.api_key, &self.crash_endpoint, self.transport.as_ref())
			.await
		{
			warn!(error = %e, "Crash cache flush failed");
		}
	}
}

/// Handle to a running telemetry agent.
///
/// Cheaply cloneable; clones share all state. Every capture and transmit
/// operation is fail-open: failures are logged and swallowed, nothing raises
/// into the caller.
#[derive(Clone)]
pub struct AgentClient {
	inner: Arc<ClientInner>,
}

impl AgentClient {
	/// Starts configuring a client for the given API key.
	pub fn builder(api_key: impl Into<String>) -> AgentClientBuilder {
		AgentClientBuilder::new(api_key)
	}

	/// The lifecycle hub host signals are fed into.
	pub fn lifecycle(&self) -> &LifecycleHub {
		&self.inner.lifecycle
	}

	/// The network-activity correlator for the host's interception layer.
	pub fn network(&self) -> &Arc<NetworkCorrelator> {
		&self.inner.network
	}

	/// The view-load correlator.
	pub fn views(&self) -> &Arc<ViewCorrelator> {
		&self.inner.views
	}

	/// The current RUM session id, if a session has started.
	pub async fn session_id(&self) -> Option<String> {
		self.inner.monitor.session_id().await
	}

	/// Adds session tags.
	pub async fn add_tags<I>(&self, tags: I)
	where
		I: IntoIterator<Item = String>,
	{
		self.inner.session.add_tags(tags).await;
	}

	/// Replaces the session user and rotates the RUM session when the
	/// identity change warrants it.
	///
	/// An anonymous user logging in keeps the session; a switch between
	/// identified users, or a logout back to anonymous, rotates it.
	pub async fn set_user(&self, input: impl Into<UserInput>) {
		let previous = self.inner.session.current_user().await;
		self.inner.session.set_user(input).await;
		let current = self.inner.session.current_user().await;

		let rotate = !previous.is_anonymous
			&& (current.is_anonymous || current.identifier != previous.identifier);
		if rotate {
			self.inner.monitor.rotate().await;
		}
	}

	/// Merges entries into the session custom-data map.
	pub async fn add_custom_data(&self, partial: Map<String, Value>) {
		self.inner.session.add_custom_data(partial).await;
	}

	/// Replaces the session custom-data map via an updater function.
	pub async fn replace_custom_data<F>(&self, updater: F)
	where
		F: FnOnce(Map<String, Value>) -> Map<String, Value>,
	{
		self.inner.session.replace_custom_data(updater).await;
	}

	/// Records a breadcrumb on the session.
	pub async fn record_breadcrumb(&self, message: impl Into<String>, options: BreadcrumbOptions) {
		self.inner.session.record_breadcrumb(message, options).await;
	}

	/// Clears the session back to a fresh anonymous one, rotating the RUM
	/// session if an identified user was active.
	pub async fn clear_session(&self) {
		let previous = self.inner.session.current_user().await;
		self.inner.session.clear_session().await;
		if !previous.is_anonymous {
			self.inner.monitor.rotate().await;
		}
	}

	/// Builds and delivers a crash report for an unhandled error.
	///
	/// The payload is built from the error, its frames, and the current
	/// session snapshot, run through the before-send hook, then delivered
	/// via the native mirror or direct POST depending on configuration.
	/// Undeliverable reports on the direct path are cached for a later
	/// resend. Never raises; every failure is logged and absorbed.
	pub async fn report_crash(&self, error: &RawError, frames: impl Into<FrameInput>) {
		if self.inner.shutdown.load(Ordering::SeqCst) {
			debug!("Crash report after shutdown, dropping");
			return;
		}

		let snapshot = self.inner.session.snapshot().await;
		let payload = build_crash_report(
			error,
			frames,
			&snapshot,
			self.inner.environment.as_ref(),
			self.inner.app_version.as_deref(),
			self.inner.clock.as_ref(),
		);

		let payload = match &self.inner.before_send {
			Some(hook) => match hook(payload) {
				Some(payload) => payload,
				None => {
					debug!("Crash report suppressed by before-send hook");
					return;
				}
			},
			None => payload,
		};

		if self.inner.native_crash_reporting {
			self.deliver_via_mirror(&payload).await;
		} else {
			self.deliver_direct(payload).await;
		}
	}

	/// Attempts to deliver any cached crash reports now.
	pub async fn flush_crash_cache(&self) {
		self.inner.flush_crash_cache().await;
	}

	/// Sends a caller-measured view timing event.
	pub async fn send_view_loaded(&self, name: &str, duration_ms: u64) {
		self.inner
			.monitor
			.send_custom_event(lantern_core::TimingType::ViewLoaded, name, duration_ms)
			.await;
	}

	/// Sends a caller-measured network timing event.
	pub async fn send_network_call(&self, name: &str, duration_ms: u64) {
		self.inner
			.monitor
			.send_custom_event(lantern_core::TimingType::NetworkCall, name, duration_ms)
			.await;
	}

	/// Shuts the agent down, detaching it from lifecycle signals.
	///
	/// Idempotent. Subsequent crash reports are dropped; session mutators
	/// keep working on the in-memory record.
	pub async fn shutdown(&self) {
		if self.inner.shutdown.swap(true, Ordering::SeqCst) {
			return;
		}
		self.inner.lifecycle.emit(LifecycleEvent::Destroy).await;
		self.inner.subscription.lock().await.take();
		info!("Telemetry agent shut down");
	}

	async fn deliver_via_mirror(&self, payload: &CrashReportPayload) {
		let Some(mirror) = &self.inner.mirror else {
			warn!("Native crash reporting enabled without a mirror, dropping report");
			return;
		};

		let json = match serde_json::to_string(payload) {
			Ok(json) => json,
			Err(e) => {
				warn!(error = %e, "Failed to serialize crash report");
				return;
			}
		};

		if let Err(e) = mirror.send_crash_report(&json, &self.inner.api_key).await {
			warn!(error = %e, "Native crash report delivery failed");
		}
	}

	async fn deliver_direct(&self, payload: CrashReportPayload) {
		let body = match serde_json::to_value(&payload) {
			Ok(body) => body,
			Err(e) => {
				warn!(error = %e, "Failed to serialize crash report");
				return;
			}
		};

		let outcome = retry(&self.inner.retry, || {
			self.inner
				.transport
				.post(&self.inner.crash_endpoint, &self.inner.api_key, &body)
		})
		.await;

		if let Err(e) = outcome {
			warn!(error = %e, "Crash report delivery failed, caching for resend");
			if let Err(e) = self.inner.crash_cache.cache_report(payload).await {
				warn!(error = %e, "Failed to cache crash report");
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clock::ManualClock;
	use crate::device::StaticDeviceInfo;
	use chrono::Utc;
	use lantern_core::{RawFrame, UserIdentity};
	use std::sync::atomic::AtomicU32;

	struct RecordingTransport {
		posts: Mutex<Vec<(String, serde_json::Value)>>,
		fail: AtomicBool,
	}

	impl RecordingTransport {
		fn new() -> Self {
			Self {
				posts: Mutex::new(Vec::new()),
				fail: AtomicBool::new(false),
			}
		}

		async fn crash_posts(&self) -> Vec<serde_json::Value> {
			self.posts
				.lock()
				.await
				.iter()
				.filter(|(url, _)| url.contains("/entries"))
				.map(|(_, body)| body.clone())
				.collect()
		}

		async fn rum_event_types(&self) -> Vec<String> {
			self.posts
				.lock()
				.await
				.iter()
				.filter(|(url, _)| url.contains("/events"))
				.map(|(_, body)| body["eventData"][0]["type"].as_str().unwrap().to_string())
				.collect()
		}
	}

	#[async_trait::async_trait]
	impl Transport for RecordingTransport {
		async fn post(&self, url: &str, _api_key: &str, body: &serde_json::Value) -> Result<()> {
			if self.fail.load(Ordering::SeqCst) {
				return Err(AgentError::ServerError {
					status: 400,
					message: "rejected".to_string(),
				});
			}
			self.posts
				.lock()
				.await
				.push((url.to_string(), body.clone()));
			Ok(())
		}
	}

	fn test_device() -> Arc<StaticDeviceInfo> {
		Arc::new(StaticDeviceInfo {
			device_id: "device-123".to_string(),
			os: "ios".to_string(),
			os_version: "17.2".to_string(),
			platform: "iPhone15,2".to_string(),
		})
	}

	async fn test_client() -> (AgentClient, Arc<RecordingTransport>) {
		let transport = Arc::new(RecordingTransport::new());
		let client = AgentClient::builder("key123")
			.device(test_device())
			.transport(transport.clone())
			.clock(Arc::new(ManualClock::new(Utc::now())))
			.app_version("1.0.0")
			.build()
			.await
			.unwrap();
		(client, transport)
	}

	#[tokio::test]
	async fn build_requires_api_key_and_device() {
		let result = AgentClient::builder("").device(test_device()).build().await;
		assert!(matches!(result, Err(AgentError::MissingApiKey)));

		let result = AgentClient::builder("key").build().await;
		assert!(matches!(result, Err(AgentError::MissingDeviceInfo)));
	}

	#[tokio::test]
	async fn crash_report_posts_to_crash_endpoint() {
		let (client, transport) = test_client().await;

		client
			.report_crash(
				&RawError::new("TypeError", "boom"),
				vec![RawFrame {
					file_name: Some("a.js".to_string()),
					method_name: None,
					line_number: Some(5),
					column_number: Some(2),
				}],
			)
			.await;

		let posts = transport.crash_posts().await;
		assert_eq!(posts.len(), 1);
		assert_eq!(posts[0]["Details"]["Error"]["Message"], "boom");
		assert_eq!(posts[0]["Details"]["Version"], "1.0.0");
	}

	#[tokio::test]
	async fn failed_crash_delivery_is_cached_and_flushable() {
		let transport = Arc::new(RecordingTransport::new());
		let cache = Arc::new(MemoryCrashCache::new());
		let client = AgentClient::builder("key123")
			.device(test_device())
			.transport(transport.clone())
			.crash_cache(cache.clone())
			.build()
			.await
			.unwrap();

		transport.fail.store(true, Ordering::SeqCst);
		client
			.report_crash(&RawError::new("E", "m"), Vec::<RawFrame>::new())
			.await;
		assert_eq!(cache.len().await, 1);
		assert!(transport.crash_posts().await.is_empty());

		transport.fail.store(false, Ordering::SeqCst);
		client.flush_crash_cache().await;
		assert!(cache.is_empty().await);
		assert_eq!(transport.crash_posts().await.len(), 1);
	}

	#[tokio::test]
	async fn before_send_hook_can_suppress_and_replace() {
		let transport = Arc::new(RecordingTransport::new());
		let suppressed = Arc::new(AtomicU32::new(0));
		let counter = suppressed.clone();
		let client = AgentClient::builder("key123")
			.device(test_device())
			.transport(transport.clone())
			.before_send(Arc::new(move |mut payload| {
				if payload.details.error.message == "drop-me" {
					counter.fetch_add(1, Ordering::SeqCst);
					return None;
				}
				payload.details.error.message = "redacted".to_string();
				Some(payload)
			}))
			.build()
			.await
			.unwrap();

		client
			.report_crash(&RawError::new("E", "drop-me"), Vec::<RawFrame>::new())
			.await;
		assert!(transport.crash_posts().await.is_empty());
		assert_eq!(suppressed.load(Ordering::SeqCst), 1);

		client
			.report_crash(&RawError::new("E", "secret"), Vec::<RawFrame>::new())
			.await;
		let posts = transport.crash_posts().await;
		assert_eq!(posts[0]["Details"]["Error"]["Message"], "redacted");
	}

	#[tokio::test]
	async fn native_path_routes_through_mirror() {
		struct RecordingMirror {
			reports: Mutex<Vec<(String, String)>>,
		}

		#[async_trait::async_trait]
		impl NativeMirror for RecordingMirror {
			async fn init(&self, _api_key: &str) -> Result<()> {
				Ok(())
			}
			async fn set_tags(&self, _tags: &[String]) -> Result<()> {
				Ok(())
			}
			async fn set_user(&self, _user: &UserIdentity) -> Result<()> {
				Ok(())
			}
			async fn set_custom_data(&self, _data: &Map<String, Value>) -> Result<()> {
				Ok(())
			}
			async fn record_breadcrumb(
				&self,
				_breadcrumb: &lantern_core::Breadcrumb,
			) -> Result<()> {
				Ok(())
			}
			async fn clear_session(&self) -> Result<()> {
				Ok(())
			}
			async fn send_crash_report(&self, report_json: &str, api_key: &str) -> Result<()> {
				self.reports
					.lock()
					.await
					.push((report_json.to_string(), api_key.to_string()));
				Ok(())
			}
		}

		let transport = Arc::new(RecordingTransport::new());
		let mirror = Arc::new(RecordingMirror {
			reports: Mutex::new(Vec::new()),
		});
		let client = AgentClient::builder("key123")
			.device(test_device())
			.transport(transport.clone())
			.native_mirror(mirror.clone())
			.native_crash_reporting(true)
			.build()
			.await
			.unwrap();

		client
			.report_crash(&RawError::new("E", "native"), Vec::<RawFrame>::new())
			.await;

		assert!(transport.crash_posts().await.is_empty());
		let reports = mirror.reports.lock().await;
		assert_eq!(reports.len(), 1);
		assert_eq!(reports[0].1, "key123");
		assert!(reports[0].0.contains("\"Message\":\"native\""));
	}

	#[tokio::test]
	async fn identified_user_switch_rotates_rum_session() {
		let (client, transport) = test_client().await;

		client.send_view_loaded("Home", 100).await;
		let first = client.session_id().await.unwrap();

		// Anonymous to identified: no rotation.
		client.set_user("alice").await;
		assert_eq!(client.session_id().await.unwrap(), first);

		// Identified to identified: rotation.
		client.set_user("bob").await;
		let second = client.session_id().await.unwrap();
		assert_ne!(second, first);

		// Logout back to anonymous: rotation.
		client.set_user("").await;
		assert_ne!(client.session_id().await.unwrap(), second);

		let types = transport.rum_event_types().await;
		assert_eq!(
			types,
			vec![
				"session_start",
				"timing",
				"session_end",
				"session_start",
				"session_end",
				"session_start"
			]
		);
	}

	#[tokio::test]
	async fn clear_session_rotates_only_when_identified() {
		let (client, transport) = test_client().await;

		client.send_view_loaded("Home", 100).await;
		client.clear_session().await;
		assert_eq!(transport.rum_event_types().await.len(), 2);

		client.set_user("alice").await;
		client.clear_session().await;
		let user = client.inner.session.current_user().await;
		assert!(user.is_anonymous);
		assert!(transport
			.rum_event_types()
			.await
			.contains(&"session_end".to_string()));
	}

	#[tokio::test]
	async fn lifecycle_view_events_produce_timings() {
		let clock = Arc::new(ManualClock::new(Utc::now()));
		let transport = Arc::new(RecordingTransport::new());
		let client = AgentClient::builder("key123")
			.device(test_device())
			.transport(transport.clone())
			.clock(clock.clone())
			.build()
			.await
			.unwrap();

		let start = clock.now();
		client
			.lifecycle()
			.emit(LifecycleEvent::ViewLoading {
				view_name: "Home".to_string(),
				time: start,
			})
			.await;
		clock.advance(chrono::Duration::milliseconds(120));
		client
			.lifecycle()
			.emit(LifecycleEvent::ViewLoaded {
				view_name: "Home".to_string(),
				time: clock.now(),
			})
			.await;

		assert_eq!(
			transport.rum_event_types().await,
			vec!["session_start", "timing"]
		);
	}

	#[tokio::test]
	async fn shutdown_is_idempotent_and_drops_crashes() {
		let (client, transport) = test_client().await;

		client.shutdown().await;
		client.shutdown().await;
		assert_eq!(client.lifecycle().subscriber_count(), 0);

		client
			.report_crash(&RawError::new("E", "late"), Vec::<RawFrame>::new())
			.await;
		assert!(transport.crash_posts().await.is_empty());
	}

	#[tokio::test]
	async fn network_correlator_ignores_own_endpoints() {
		let (client, _transport) = test_client().await;

		assert!(client
			.network()
			.on_open("POST", DEFAULT_RUM_ENDPOINT)
			.is_none());
		assert!(client
			.network()
			.on_open("POST", DEFAULT_CRASH_ENDPOINT)
			.is_none());
	}
}
