// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Lantern mobile telemetry agent.
//!
//! This crate provides the shared domain and wire types used by the agent:
//! crash-report payloads, real-user-monitoring (RUM) events, user identity,
//! breadcrumbs, stack frames, and the RUM session identifier. It is consumed
//! by the `lantern-agent` SDK and by anything that needs to produce or parse
//! the wire payloads.

pub mod breadcrumb;
pub mod error;
pub mod event;
pub mod frame;
pub mod report;
pub mod session;
pub mod user;

pub use breadcrumb::{Breadcrumb, BreadcrumbLevel, BreadcrumbOptions};
pub use error::{CoreError, Result};
pub use event::{
	encode_timing_data, EventEnvelope, RumEvent, RumEventType, TimingEntry, TimingInfo, TimingType,
};
pub use frame::{FrameInput, RawError, RawFrame, StackFrame};
pub use report::{ClientInfo, CrashReportPayload, Details, ErrorDetails, VERSION_NOT_SUPPLIED};
pub use session::RumSessionId;
pub use user::{UserIdentity, UserInput};
