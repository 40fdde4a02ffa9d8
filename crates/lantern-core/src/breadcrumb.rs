// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Breadcrumb types (diagnostic notes leading up to a crash).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A timestamped diagnostic note attached to the session.
///
/// Serialized with capitalized keys for the crash-report wire shape; the
/// timestamp goes out as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
	#[serde(rename = "Message")]
	pub message: String,
	/// "http", "navigation", "ui", "console"
	#[serde(rename = "Category")]
	pub category: String,
	#[serde(rename = "Level")]
	pub level: BreadcrumbLevel,
	#[serde(rename = "CustomData")]
	pub custom_data: serde_json::Value,
	#[serde(rename = "Timestamp", with = "chrono::serde::ts_milliseconds")]
	pub timestamp: DateTime<Utc>,
}

/// Caller-supplied overrides for [`Breadcrumb`] defaults.
///
/// Unset fields default to `{category: "", level: Info, custom_data: {}}`.
/// The timestamp is never caller-supplied; recording always stamps the
/// current time.
#[derive(Debug, Clone, Default)]
pub struct BreadcrumbOptions {
	pub category: Option<String>,
	pub level: Option<BreadcrumbLevel>,
	pub custom_data: Option<serde_json::Value>,
}

impl Breadcrumb {
	/// Builds a breadcrumb from a message and options, stamped at `now`.
	pub fn new(message: impl Into<String>, options: BreadcrumbOptions, now: DateTime<Utc>) -> Self {
		Self {
			message: message.into(),
			category: options.category.unwrap_or_default(),
			level: options.level.unwrap_or(BreadcrumbLevel::Info),
			custom_data: options
				.custom_data
				.unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new())),
			timestamp: now,
		}
	}
}

/// Severity level of a breadcrumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreadcrumbLevel {
	Debug,
	Info,
	Warning,
	Error,
}

impl fmt::Display for BreadcrumbLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Debug => write!(f, "debug"),
			Self::Info => write!(f, "info"),
			Self::Warning => write!(f, "warning"),
			Self::Error => write!(f, "error"),
		}
	}
}

impl FromStr for BreadcrumbLevel {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"debug" => Ok(Self::Debug),
			"info" => Ok(Self::Info),
			"warning" => Ok(Self::Warning),
			"error" => Ok(Self::Error),
			_ => Err(CoreError::InvalidBreadcrumbLevel(s.to_string())),
		}
	}
}
