// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash-report payload construction.

use chrono::Local;
use serde_json::{Map, Value};

use lantern_core::{
	ClientInfo, CrashReportPayload, Details, ErrorDetails, FrameInput, RawError, StackFrame,
	VERSION_NOT_SUPPLIED,
};

use crate::clock::Clock;
use crate::session::SessionSnapshot;

/// Reporting client name embedded in every crash payload.
pub const CLIENT_NAME: &str = "lantern-agent";
/// Reporting client version embedded in every crash payload.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment metadata collaborator.
///
/// Entries returned here are merged over the defaults (`UtcOffset`,
/// `JailBroken`) and may overwrite them.
pub trait EnvironmentProvider: Send + Sync {
	fn environment(&self) -> Map<String, Value>;
}

/// Provider contributing nothing beyond the defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEnvironment;

impl EnvironmentProvider for DefaultEnvironment {
	fn environment(&self) -> Map<String, Value> {
		Map::new()
	}
}

/// Builds a crash-report payload from a raw error, its stack frames, and a
/// session snapshot.
///
/// Pure apart from the occurrence timestamp, which comes from the injected
/// clock, and the local timezone offset default.
pub fn build_crash_report(
	error: &RawError,
	frames: impl Into<FrameInput>,
	snapshot: &SessionSnapshot,
	environment: &dyn EnvironmentProvider,
	app_version: Option<&str>,
	clock: &dyn Clock,
) -> CrashReportPayload {
	let stack_trace: Vec<StackFrame> = frames
		.into()
		.into_frames()
		.iter()
		.map(StackFrame::from_raw)
		.collect();

	let mut env = Map::new();
	env.insert("UtcOffset".to_string(), Value::from(utc_offset_hours()));
	env.insert("JailBroken".to_string(), Value::from(false));
	for (key, value) in environment.environment() {
		env.insert(key, value);
	}

	CrashReportPayload {
		occurred_on: clock.now(),
		details: Details {
			error: ErrorDetails {
				class_name: error.class_name().to_string(),
				message: error.message().to_string(),
				stack_string: error.string_form(),
				stack_trace,
			},
			environment: env,
			client: ClientInfo {
				name: CLIENT_NAME.to_string(),
				version: CLIENT_VERSION.to_string(),
			},
			user_custom_data: snapshot.custom_data.clone(),
			tags: snapshot.tags.clone(),
			user: snapshot.user.clone(),
			breadcrumbs: snapshot.breadcrumbs.clone(),
			version: app_version
				.map(str::to_string)
				.unwrap_or_else(|| VERSION_NOT_SUPPLIED.to_string()),
		},
	}
}

/// Local timezone offset from UTC, in hours.
fn utc_offset_hours() -> f64 {
	f64::from(Local::now().offset().local_minus_utc()) / 3600.0
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clock::ManualClock;
	use chrono::{TimeZone, Utc};
	use lantern_core::{RawFrame, UserIdentity};

	fn test_snapshot() -> SessionSnapshot {
		SessionSnapshot {
			user: UserIdentity::anonymous("device-123"),
			tags: vec!["x".to_string()],
			custom_data: Map::new(),
			breadcrumbs: Vec::new(),
		}
	}

	#[test]
	fn maps_error_and_frames_into_wire_shape() {
		let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
		let error = RawError::new("TypeError", "boom");
		let frame = RawFrame {
			file_name: Some("a.js".to_string()),
			method_name: None,
			line_number: Some(5),
			column_number: Some(2),
		};

		let payload = build_crash_report(
			&error,
			frame,
			&test_snapshot(),
			&DefaultEnvironment,
			None,
			&clock,
		);

		assert_eq!(payload.details.error.message, "boom");
		assert_eq!(payload.details.error.class_name, "TypeError");
		assert_eq!(payload.details.error.stack_string, "TypeError: boom");
		assert_eq!(payload.details.tags, vec!["x"]);
		assert_eq!(payload.details.error.stack_trace.len(), 1);
		assert_eq!(payload.details.error.stack_trace[0].line_number, 5);
		assert_eq!(payload.details.error.stack_trace[0].method_name, "[anonymous]");
		assert_eq!(
			payload.occurred_on,
			Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
		);
	}

	#[test]
	fn missing_name_and_message_default_to_empty() {
		let clock = ManualClock::new(Utc::now());
		let payload = build_crash_report(
			&RawError::default(),
			Vec::<RawFrame>::new(),
			&test_snapshot(),
			&DefaultEnvironment,
			None,
			&clock,
		);

		assert_eq!(payload.details.error.class_name, "");
		assert_eq!(payload.details.error.message, "");
		assert!(payload.details.error.stack_trace.is_empty());
	}

	#[test]
	fn environment_defaults_present_and_overridable() {
		struct JailbrokenEnv;
		impl EnvironmentProvider for JailbrokenEnv {
			fn environment(&self) -> Map<String, Value> {
				let mut map = Map::new();
				map.insert("JailBroken".to_string(), Value::from(true));
				map.insert("DeviceName".to_string(), Value::from("test-device"));
				map
			}
		}

		let clock = ManualClock::new(Utc::now());
		let payload = build_crash_report(
			&RawError::new("E", "m"),
			Vec::<RawFrame>::new(),
			&test_snapshot(),
			&JailbrokenEnv,
			None,
			&clock,
		);

		assert_eq!(payload.details.environment["JailBroken"], Value::from(true));
		assert_eq!(
			payload.details.environment["DeviceName"],
			Value::from("test-device")
		);
		assert!(payload.details.environment.contains_key("UtcOffset"));
	}

	#[test]
	fn app_version_defaults_to_not_supplied() {
		let clock = ManualClock::new(Utc::now());
		let without = build_crash_report(
			&RawError::default(),
			Vec::<RawFrame>::new(),
			&test_snapshot(),
			&DefaultEnvironment,
			None,
			&clock,
		);
		assert_eq!(without.details.version, VERSION_NOT_SUPPLIED);

		let with = build_crash_report(
			&RawError::default(),
			Vec::<RawFrame>::new(),
			&test_snapshot(),
			&DefaultEnvironment,
			Some("2.3.4"),
			&clock,
		);
		assert_eq!(with.details.version, "2.3.4");
	}

	#[test]
	fn fixed_clock_makes_payload_reproducible() {
		let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
		let a = build_crash_report(
			&RawError::new("E", "m"),
			Vec::<RawFrame>::new(),
			&test_snapshot(),
			&DefaultEnvironment,
			Some("1.0"),
			&clock,
		);
		let b = build_crash_report(
			&RawError::new("E", "m"),
			Vec::<RawFrame>::new(),
			&test_snapshot(),
			&DefaultEnvironment,
			Some("1.0"),
			&clock,
		);
		assert_eq!(
			serde_json::to_value(&a).unwrap(),
			serde_json::to_value(&b).unwrap()
		);
	}
}
