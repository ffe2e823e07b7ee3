// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete implementations of the `udevd-ports` trait contracts, wired
//! up by `main.rs`. Each mirrors the teacher's `adapters` module: a
//! thin, swappable implementation behind a trait defined one crate over.

pub mod control;
pub mod inotify;
pub mod netlink;
pub mod rules;

pub use control::UnixControlChannel;
pub use inotify::RealInotify;
pub use netlink::NetlinkMonitorHandle;
pub use rules::PropertyOverrideRuleEngine;
