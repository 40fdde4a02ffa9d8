// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Real-user-monitoring event wire payloads.
//!
//! Events are POSTed one per HTTP call, batched as a single-element array
//! under `eventData`. The `data` field is a JSON-stringified array holding
//! one timing entry (empty for session lifecycle events).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::user::UserIdentity;

/// Type of a RUM event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RumEventType {
	SessionStart,
	SessionEnd,
	Timing,
}

impl fmt::Display for RumEventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::SessionStart => write!(f, "session_start"),
			Self::SessionEnd => write!(f, "session_end"),
			Self::Timing => write!(f, "timing"),
		}
	}
}

impl FromStr for RumEventType {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"session_start" => Ok(Self::SessionStart),
			"session_end" => Ok(Self::SessionEnd),
			"timing" => Ok(Self::Timing),
			_ => Err(CoreError::InvalidEventType(s.to_string())),
		}
	}
}

/// Type of a timing measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingType {
	ViewLoaded,
	NetworkCall,
}

impl fmt::Display for TimingType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::ViewLoaded => write!(f, "view_loaded"),
			Self::NetworkCall => write!(f, "network_call"),
		}
	}
}

impl FromStr for TimingType {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"view_loaded" => Ok(Self::ViewLoaded),
			"network_call" => Ok(Self::NetworkCall),
			_ => Err(CoreError::InvalidTimingType(s.to_string())),
		}
	}
}

/// A timing measurement attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingInfo {
	#[serde(rename = "type")]
	pub timing_type: TimingType,
	/// Elapsed time in milliseconds.
	pub duration: u64,
}

/// One named timing entry inside an event's `data` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingEntry {
	pub name: String,
	pub timing: TimingInfo,
}

/// A single RUM event in wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RumEvent {
	#[serde(rename = "type")]
	pub event_type: RumEventType,
	/// ISO-8601 occurrence time.
	pub timestamp: DateTime<Utc>,
	pub tags: Vec<String>,
	pub user: UserIdentity,
	#[serde(rename = "sessionId")]
	pub session_id: String,
	/// Application version.
	pub version: String,
	pub os: String,
	#[serde(rename = "osVersion")]
	pub os_version: String,
	pub platform: String,
	/// JSON-stringified array of [`TimingEntry`] values.
	pub data: String,
}

/// The envelope POSTed to the collection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
	#[serde(rename = "eventData")]
	pub event_data: Vec<RumEvent>,
}

impl EventEnvelope {
	/// Wraps a single event, the only batch size the agent produces.
	pub fn single(event: RumEvent) -> Self {
		Self {
			event_data: vec![event],
		}
	}
}

/// Serializes timing entries into the stringified `data` field.
pub fn encode_timing_data(entries: &[TimingEntry]) -> String {
	// Timing entries contain only strings and integers, so serialization
	// cannot fail; fall back to an empty array regardless.
	serde_json::to_string(entries).unwrap_or_else(|_| "[]".to_string())
}
