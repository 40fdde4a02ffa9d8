// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Device and platform information collaborator.

use lantern_core::UserIdentity;

/// Device/platform info supplied by the host's native bridge.
pub trait DeviceInfo: Send + Sync {
	/// Stable per-device identifier.
	fn device_based_id(&self) -> String;
	/// Operating system name, e.g. "ios", "android".
	fn platform_os(&self) -> String;
	/// Operating system version string.
	fn os_version(&self) -> String;
	/// Device model/platform string, e.g. "iPhone15,2".
	fn platform(&self) -> String;
}

/// Fixed device info, useful for hosts with static metadata and for tests.
#[derive(Debug, Clone)]
pub struct StaticDeviceInfo {
	pub device_id: String,
	pub os: String,
	pub os_version: String,
	pub platform: String,
}

impl DeviceInfo for StaticDeviceInfo {
	fn device_based_id(&self) -> String {
		self.device_id.clone()
	}

	fn platform_os(&self) -> String {
		self.os.clone()
	}

	fn os_version(&self) -> String {
		self.os_version.clone()
	}

	fn platform(&self) -> String {
		self.platform.clone()
	}
}

/// Derives the anonymous identity for a device.
///
/// The identifier is `anonymous-` followed by the stable device id, flagged
/// `is_anonymous` so downstream consumers can distinguish it from a login.
pub fn anonymous_identity(device: &dyn DeviceInfo) -> UserIdentity {
	UserIdentity::anonymous(&device.device_based_id())
}
