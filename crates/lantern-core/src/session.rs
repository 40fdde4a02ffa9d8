// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! RUM session identifier.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque token grouping RUM events into one transmission-scoped session.
///
/// Distinct from the in-memory session context: a new id is generated on
/// idle-timeout rotation or explicit rotation while the session context
/// (user, tags, breadcrumbs) lives on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RumSessionId(String);

impl RumSessionId {
	/// Generates a fresh 32-character random token.
	#[must_use]
	pub fn generate() -> Self {
		Self(Uuid::new_v4().simple().to_string())
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for RumSessionId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}
