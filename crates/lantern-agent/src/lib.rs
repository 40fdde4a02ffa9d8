// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lantern mobile telemetry agent.
//!
//! The agent captures unhandled errors and user-interaction/performance
//! events inside a running application, enriches them with session context
//! (user identity, tags, breadcrumbs, custom data), and transmits them to a
//! remote collection endpoint. Delivery is strictly fail-open: nothing in
//! this crate ever raises into application code or blocks caller-visible
//! control flow on a network failure.
//!
//! # Overview
//!
//! - [`AgentClient`]: the coordinator; owns session state and wires the
//!   pieces together.
//! - [`SessionState`]: user identity, tags, breadcrumbs, custom data.
//! - [`RealUserMonitor`]: RUM session rotation and event transmission.
//! - [`NetworkCorrelator`] / [`ViewCorrelator`]: pair raw open/send/response
//!   and view-load callbacks into timed events.
//! - [`Transport`] / [`CrashCache`] / [`NativeMirror`] / [`DeviceInfo`]:
//!   collaborator traits at the external boundary.

pub mod client;
pub mod clock;
pub mod device;
pub mod error;
pub mod lifecycle;
pub mod monitor;
pub mod network;
pub mod report;
pub mod session;
pub mod transport;
pub mod view;

pub use client::{AgentClient, AgentClientBuilder, BeforeSendHook};
pub use clock::{Clock, ManualClock, SystemClock};
pub use device::{DeviceInfo, StaticDeviceInfo};
pub use error::{AgentError, Result};
pub use lifecycle::{LifecycleEvent, LifecycleHub, Subscription};
pub use monitor::{RealUserMonitor, SESSION_IDLE_TIMEOUT};
pub use network::{CorrelationId, NetworkCorrelator, DEFAULT_IGNORED_URLS};
pub use report::{build_crash_report, DefaultEnvironment, EnvironmentProvider};
pub use session::{NativeMirror, SessionSnapshot, SessionState};
pub use transport::{
	CrashCache, HttpTransport, MemoryCrashCache, Transport, DEFAULT_CRASH_ENDPOINT,
	DEFAULT_RUM_ENDPOINT,
};
pub use view::ViewCorrelator;
