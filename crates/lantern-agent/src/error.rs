// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the telemetry agent.

use lantern_common_http::RetryableError;
use thiserror::Error;

/// Result type alias for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors that can occur in the telemetry agent.
///
/// These surface only at the collaborator boundary (transport, cache, native
/// mirror) and from builder validation. The public capture/transmit paths
/// swallow them after logging; nothing propagates into application code.
#[derive(Debug, Error)]
pub enum AgentError {
	/// API key is missing.
	#[error("API key is required")]
	MissingApiKey,

	/// Device info collaborator is missing.
	#[error("device info provider is required")]
	MissingDeviceInfo,

	/// The client has been shut down.
	#[error("agent client has been shut down")]
	ClientShutdown,

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Server returned an error response.
	#[error("server error ({status}): {message}")]
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Error message from server.
		message: String,
	},

	/// Rate limited by the server.
	#[error("rate limited, retry after {retry_after_secs:?} seconds")]
	RateLimited {
		/// Optional retry-after header value.
		retry_after_secs: Option<u64>,
	},

	/// Failed to serialize a payload.
	#[error("serialization error: {0}")]
	SerializationError(#[from] serde_json::Error),

	/// Native bridge call failed.
	#[error("native bridge error: {0}")]
	NativeBridge(String),

	/// Crash cache operation failed.
	#[error("cache error: {0}")]
	Cache(String),
}

impl RetryableError for AgentError {
	fn is_retryable(&self) -> bool {
		match self {
			AgentError::RequestFailed(e) => e.is_retryable(),
			AgentError::ServerError { status, .. } => {
				matches!(*status, 429 | 408 | 500 | 502 | 503 | 504)
			}
			AgentError::RateLimited { .. } => true,
			_ => false,
		}
	}
}
