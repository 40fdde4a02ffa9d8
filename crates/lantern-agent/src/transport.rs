// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Network transport and offline crash-report cache boundary.

use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use lantern_core::CrashReportPayload;

use crate::error::{AgentError, Result};

/// Default crash-report collection endpoint.
pub const DEFAULT_CRASH_ENDPOINT: &str = "https://ingest.lantern.dev/entries";
/// Default RUM event collection endpoint.
pub const DEFAULT_RUM_ENDPOINT: &str = "https://ingest.lantern.dev/events";

/// Header carrying the API key on every delivery.
const API_KEY_HEADER: &str = "X-ApiKey";

/// Delivery boundary for both crash reports and RUM events.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
	/// POSTs a JSON body to `url`, authenticated with `api_key`.
	async fn post(&self, url: &str, api_key: &str, body: &serde_json::Value) -> Result<()>;
}

/// Transport over the shared reqwest client.
pub struct HttpTransport {
	client: reqwest::Client,
}

impl HttpTransport {
	/// Creates a transport with the given request timeout.
	pub fn new(request_timeout: Duration) -> Result<Self> {
		let client = lantern_common_http::builder()
			.timeout(request_timeout)
			.build()
			.map_err(AgentError::RequestFailed)?;
		Ok(Self { client })
	}
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
	async fn post(&self, url: &str, api_key: &str, body: &serde_json::Value) -> Result<()> {
		debug!(url = %url, "Posting telemetry payload");

		let response = self
			.client
			.post(url)
			.header(API_KEY_HEADER, api_key)
			.json(body)
			.send()
			.await?;

		if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
			let retry_after = response
				.headers()
				.get("Retry-After")
				.and_then(|v| v.to_str().ok())
				.and_then(|s| s.parse().ok());
			return Err(AgentError::RateLimited {
				retry_after_secs: retry_after,
			});
		}

		if !response.status().is_success() {
			let status = response.status().as_u16();
			let message = response.text().await.unwrap_or_default();
			return Err(AgentError::ServerError { status, message });
		}

		Ok(())
	}
}

/// Offline cache for crash reports that could not be delivered.
///
/// RUM events are lossy by design and never cached; crash reports are not,
/// so a failed delivery hands the payload here for a later resend.
#[async_trait::async_trait]
pub trait CrashCache: Send + Sync {
	/// Stores a report for later delivery.
	async fn cache_report(&self, payload: CrashReportPayload) -> Result<()>;

	/// Attempts to deliver all cached reports, keeping the ones that fail.
	async fn flush(&self, api_key: &str, endpoint: &str, transport: &dyn Transport)
		-> Result<()>;
}

/// In-memory crash cache, the default when the host provides no persistent one.
///
/// Contents are lost with the process; hosts wanting durable offline caching
/// supply their own [`CrashCache`] over device storage.
#[derive(Default)]
pub struct MemoryCrashCache {
	reports: Mutex<Vec<CrashReportPayload>>,
}

impl MemoryCrashCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of reports currently cached.
	pub async fn len(&self) -> usize {
		self.reports.lock().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.reports.lock().await.is_empty()
	}
}

#[async_trait::async_trait]
impl CrashCache for MemoryCrashCache {
	async fn cache_report(&self, payload: CrashReportPayload) -> Result<()> {
		let mut reports = self.reports.lock().await;
		reports.push(payload);
		debug!(cached = reports.len(), "Cached crash report for resend");
		Ok(())
	}

	async fn flush(
		&self,
		api_key: &str,
		endpoint: &str,
		transport: &dyn Transport,
	) -> Result<()> {
		let pending = {
			let mut reports = self.reports.lock().await;
			std::mem::take(&mut *reports)
		};

		if pending.is_empty() {
			return Ok(());
		}

		debug!(count = pending.len(), "Flushing cached crash reports");

		let mut kept = Vec::new();
		for payload in pending {
			let body = serde_json::to_value(&payload)?;
			if let Err(e) = transport.post(endpoint, api_key, &body).await {
				warn!(error = %e, "Cached crash report delivery failed, keeping");
				kept.push(payload);
			}
		}

		if !kept.is_empty() {
			let mut reports = self.reports.lock().await;
			// New reports cached during the flush stay behind the retained ones.
			kept.append(&mut reports);
			*reports = kept;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicBool, Ordering};
	use wiremock::matchers::{header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	struct RecordingTransport {
		pub posts: Mutex<Vec<(String, serde_json::Value)>>,
		pub fail: AtomicBool,
	}

	impl RecordingTransport {
		fn new() -> Self {
			Self {
				posts: Mutex::new(Vec::new()),
				fail: AtomicBool::new(false),
			}
		}
	}

	#[async_trait::async_trait]
	impl Transport for RecordingTransport {
		async fn post(&self, url: &str, _api_key: &str, body: &serde_json::Value) -> Result<()> {
			if self.fail.load(Ordering::SeqCst) {
				return Err(AgentError::ServerError {
					status: 500,
					message: "down".to_string(),
				});
			}
			self.posts
				.lock()
				.await
				.push((url.to_string(), body.clone()));
			Ok(())
		}
	}

	fn sample_report() -> CrashReportPayload {
		serde_json::from_value(serde_json::json!({
			"OccurredOn": "2025-06-01T12:00:00Z",
			"Details": {
				"Error": {
					"ClassName": "E",
					"Message": "m",
					"StackString": "E: m",
					"StackTrace": []
				},
				"Environment": {},
				"Client": { "Name": "lantern-agent", "Version": "0.1.0" },
				"UserCustomData": {},
				"Tags": [],
				"User": {
					"Identifier": "anonymous-d",
					"IsAnonymous": true,
					"Email": "",
					"FirstName": "",
					"FullName": "",
					"UUID": ""
				},
				"Breadcrumbs": [],
				"Version": "Not supplied"
			}
		}))
		.unwrap()
	}

	#[tokio::test]
	async fn http_transport_posts_with_api_key_header() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/entries"))
			.and(header("X-ApiKey", "key123"))
			.respond_with(ResponseTemplate::new(202))
			.expect(1)
			.mount(&server)
			.await;

		let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
		let url = format!("{}/entries", server.uri());
		let result = transport
			.post(&url, "key123", &serde_json::json!({"ok": true}))
			.await;

		assert!(result.is_ok());
	}

	#[tokio::test]
	async fn http_transport_maps_server_errors() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(500).set_body_string("oops"))
			.mount(&server)
			.await;

		let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
		let result = transport
			.post(&server.uri(), "key123", &serde_json::json!({}))
			.await;

		assert!(matches!(
			result,
			Err(AgentError::ServerError { status: 500, .. })
		));
	}

	#[tokio::test]
	async fn http_transport_maps_rate_limiting() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
			.mount(&server)
			.await;

		let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
		let result = transport
			.post(&server.uri(), "key123", &serde_json::json!({}))
			.await;

		assert!(matches!(
			result,
			Err(AgentError::RateLimited {
				retry_after_secs: Some(30)
			})
		));
	}

	#[tokio::test]
	async fn memory_cache_flush_delivers_and_drains() {
		let cache = MemoryCrashCache::new();
		cache.cache_report(sample_report()).await.unwrap();
		cache.cache_report(sample_report()).await.unwrap();
		assert_eq!(cache.len().await, 2);

		let transport = RecordingTransport::new();
		cache
			.flush("key", DEFAULT_CRASH_ENDPOINT, &transport)
			.await
			.unwrap();

		assert!(cache.is_empty().await);
		assert_eq!(transport.posts.lock().await.len(), 2);
	}

	#[tokio::test]
	async fn memory_cache_keeps_failed_deliveries() {
		let cache = MemoryCrashCache::new();
		cache.cache_report(sample_report()).await.unwrap();

		let transport = RecordingTransport::new();
		transport.fail.store(true, Ordering::SeqCst);
		cache
			.flush("key", DEFAULT_CRASH_ENDPOINT, &transport)
			.await
			.unwrap();

		assert_eq!(cache.len().await, 1);
	}

	#[tokio::test]
	async fn flush_on_empty_cache_posts_nothing() {
		let cache = MemoryCrashCache::new();
		let transport = RecordingTransport::new();
		cache
			.flush("key", DEFAULT_CRASH_ENDPOINT, &transport)
			.await
			.unwrap();
		assert!(transport.posts.lock().await.is_empty());
	}
}
