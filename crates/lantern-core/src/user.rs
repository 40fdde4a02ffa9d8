// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User identity types for session context.

use serde::{Deserialize, Serialize};

/// Identity of the user owning the current session.
///
/// Serialized with capitalized keys, which is the shape both the crash-report
/// and RUM wire payloads expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
	#[serde(rename = "Identifier")]
	pub identifier: String,
	#[serde(rename = "IsAnonymous")]
	pub is_anonymous: bool,
	#[serde(rename = "Email")]
	pub email: String,
	#[serde(rename = "FirstName")]
	pub first_name: String,
	#[serde(rename = "FullName")]
	pub full_name: String,
	#[serde(rename = "UUID")]
	pub uuid: String,
}

impl UserIdentity {
	/// Creates an identified user with all other fields defaulted empty.
	pub fn identified(identifier: impl Into<String>) -> Self {
		Self {
			identifier: identifier.into(),
			is_anonymous: false,
			email: String::new(),
			first_name: String::new(),
			full_name: String::new(),
			uuid: String::new(),
		}
	}

	/// Creates an anonymous identity derived from a stable device id.
	pub fn anonymous(device_id: &str) -> Self {
		Self {
			identifier: format!("anonymous-{device_id}"),
			is_anonymous: true,
			email: String::new(),
			first_name: String::new(),
			full_name: String::new(),
			uuid: String::new(),
		}
	}
}

/// Tolerant user input accepted at the SDK boundary.
///
/// Callers may supply either a bare identifier string or a full identity
/// record. The union is resolved once, into a canonical [`UserIdentity`],
/// before any session logic runs.
#[derive(Debug, Clone)]
pub enum UserInput {
	/// A bare identifier string. Empty maps to the anonymous identity.
	Identifier(String),
	/// A full identity record, used as-is.
	Full(UserIdentity),
}

impl UserInput {
	/// Resolves the input into a canonical identity.
	///
	/// An empty identifier string maps to `anonymous`, flagged as such.
	pub fn resolve(self, anonymous: UserIdentity) -> UserIdentity {
		match self {
			UserInput::Identifier(id) if id.is_empty() => anonymous,
			UserInput::Identifier(id) => UserIdentity::identified(id),
			UserInput::Full(user) => user,
		}
	}
}

impl From<&str> for UserInput {
	fn from(s: &str) -> Self {
		UserInput::Identifier(s.to_string())
	}
}

impl From<String> for UserInput {
	fn from(s: String) -> Self {
		UserInput::Identifier(s)
	}
}

impl From<UserIdentity> for UserInput {
	fn from(user: UserIdentity) -> Self {
		UserInput::Full(user)
	}
}
