// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Trait contracts for the supervisor's external collaborators: the rule
//! database, the kernel uevent transport, the control channel codec, and
//! inotify. Each is deliberately out of scope for a concrete
//! implementation here — the daemon crate wires real adapters, tests wire
//! the `Fake*` ones behind `test-support`.

pub mod control;
pub mod error;
pub mod monitor;
pub mod rules;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod watch;

pub use control::{ControlChannel, ControlMessage};
pub use error::{ControlError, MonitorError, RuleEngineError, WatchError};
pub use monitor::NetlinkMonitor;
pub use rules::RuleEngine;
pub use watch::{Inotify, WatchEvent};

#[cfg(any(test, feature = "test-support"))]
pub use control::FakeControlChannel;
#[cfg(any(test, feature = "test-support"))]
pub use monitor::FakeMonitor;
#[cfg(any(test, feature = "test-support"))]
pub use rules::FakeRuleEngine;
#[cfg(any(test, feature = "test-support"))]
pub use watch::FakeInotify;
