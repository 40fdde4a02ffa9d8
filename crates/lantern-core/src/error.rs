// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for Lantern core types.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while working with core types.
#[derive(Debug, Error)]
pub enum CoreError {
	/// Unknown breadcrumb level string.
	#[error("invalid breadcrumb level: {0}")]
	InvalidBreadcrumbLevel(String),

	/// Unknown RUM event type string.
	#[error("invalid event type: {0}")]
	InvalidEventType(String),

	/// Unknown timing type string.
	#[error("invalid timing type: {0}")]
	InvalidTimingType(String),
}
