// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash-report wire payload.
//!
//! The payload is an immutable snapshot built once per error occurrence; an
//! upstream hook may replace it wholesale but never patches it in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::breadcrumb::Breadcrumb;
use crate::frame::StackFrame;
use crate::user::UserIdentity;

/// Application version placeholder when the caller never supplied one.
pub const VERSION_NOT_SUPPLIED: &str = "Not supplied";

/// Complete crash-report payload, serialized with capitalized keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrashReportPayload {
	#[serde(rename = "OccurredOn")]
	pub occurred_on: DateTime<Utc>,
	#[serde(rename = "Details")]
	pub details: Details,
}

/// The details block of a crash report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Details {
	#[serde(rename = "Error")]
	pub error: ErrorDetails,
	/// Environment metadata. Defaults carry `UtcOffset` (hours) and
	/// `JailBroken`; an environment-info collaborator may overwrite them.
	#[serde(rename = "Environment")]
	pub environment: Map<String, Value>,
	#[serde(rename = "Client")]
	pub client: ClientInfo,
	#[serde(rename = "UserCustomData")]
	pub user_custom_data: Map<String, Value>,
	#[serde(rename = "Tags")]
	pub tags: Vec<String>,
	#[serde(rename = "User")]
	pub user: UserIdentity,
	#[serde(rename = "Breadcrumbs")]
	pub breadcrumbs: Vec<Breadcrumb>,
	/// Application version, `"Not supplied"` when unset.
	#[serde(rename = "Version")]
	pub version: String,
}

/// The error block of a crash report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
	#[serde(rename = "ClassName")]
	pub class_name: String,
	#[serde(rename = "Message")]
	pub message: String,
	/// The error's string form, e.g. `"TypeError: boom"`.
	#[serde(rename = "StackString")]
	pub stack_string: String,
	#[serde(rename = "StackTrace")]
	pub stack_trace: Vec<StackFrame>,
}

/// Reporting client identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
	#[serde(rename = "Name")]
	pub name: String,
	#[serde(rename = "Version")]
	pub version: String,
}
