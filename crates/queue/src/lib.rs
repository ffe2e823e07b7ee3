// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! udevd-queue: the pending-event queue and its device-topology ordering
//! predicate.

pub mod error;
pub mod marker;
pub mod queue;

pub use error::QueueError;
pub use marker::QueueMarker;
pub use queue::{CleanupFilter, EventQueue};
