// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Raw error and stack-frame inputs, and the wire stack-frame shape.

use serde::{Deserialize, Serialize};

/// Method name used when a frame does not carry one.
pub const ANONYMOUS_METHOD: &str = "[anonymous]";

/// A raw error as supplied by the host error source.
///
/// Both fields are optional; a missing name or message defaults to the empty
/// string rather than failing payload construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawError {
	pub name: Option<String>,
	pub message: Option<String>,
}

impl RawError {
	/// Creates a raw error from a name and message.
	pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			name: Some(name.into()),
			message: Some(message.into()),
		}
	}

	/// The error class name, defaulted to empty.
	pub fn class_name(&self) -> &str {
		self.name.as_deref().unwrap_or("")
	}

	/// The error message, defaulted to empty.
	pub fn message(&self) -> &str {
		self.message.as_deref().unwrap_or("")
	}

	/// The string form, `"Name: message"`, with empty parts omitted.
	pub fn string_form(&self) -> String {
		match (self.class_name(), self.message()) {
			("", "") => String::new(),
			(name, "") => name.to_string(),
			("", message) => message.to_string(),
			(name, message) => format!("{name}: {message}"),
		}
	}
}

/// A raw stack frame as supplied by the host error source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFrame {
	pub file_name: Option<String>,
	pub method_name: Option<String>,
	pub line_number: Option<u32>,
	pub column_number: Option<u32>,
}

/// Tolerant stack-frame input: a single frame or an ordered sequence.
///
/// Resolved once at the SDK boundary into a canonical `Vec<RawFrame>` before
/// any payload logic runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FrameInput {
	Single(RawFrame),
	Many(Vec<RawFrame>),
}

impl FrameInput {
	/// Resolves the input into an ordered frame sequence.
	pub fn into_frames(self) -> Vec<RawFrame> {
		match self {
			FrameInput::Single(frame) => vec![frame],
			FrameInput::Many(frames) => frames,
		}
	}
}

impl From<RawFrame> for FrameInput {
	fn from(frame: RawFrame) -> Self {
		FrameInput::Single(frame)
	}
}

impl From<Vec<RawFrame>> for FrameInput {
	fn from(frames: Vec<RawFrame>) -> Self {
		FrameInput::Many(frames)
	}
}

/// A stack frame in the crash-report wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
	#[serde(rename = "FileName")]
	pub file_name: String,
	#[serde(rename = "MethodName")]
	pub method_name: String,
	#[serde(rename = "LineNumber")]
	pub line_number: u32,
	#[serde(rename = "ColumnNumber")]
	pub column_number: u32,
	/// Synthesized label combining line and column.
	#[serde(rename = "ClassName")]
	pub class_name: String,
}

impl StackFrame {
	/// Maps a raw frame into the wire shape.
	pub fn from_raw(raw: &RawFrame) -> Self {
		let line_number = raw.line_number.unwrap_or(0);
		let column_number = raw.column_number.unwrap_or(0);
		Self {
			file_name: raw.file_name.clone().unwrap_or_default(),
			method_name: raw
				.method_name
				.clone()
				.unwrap_or_else(|| ANONYMOUS_METHOD.to_string()),
			line_number,
			column_number,
			class_name: format!("line {line_number}, column {column_number}"),
		}
	}
}
