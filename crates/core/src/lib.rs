// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! udevd-core: shared data model for the device-event supervisor.
//!
//! This crate holds only passive data: device/event/worker records, id
//! types, a testable clock, and the error types shared by every other
//! crate in the workspace. It has no knowledge of the event loop, the
//! queue's ordering algorithm, or process management.

pub mod clock;
pub mod device;
pub mod error;
pub mod event;
pub mod seqnum;
pub mod worker;

pub use clock::{Clock, FakeClock, SystemClock};
pub use device::{Action, Device, DevNum};
pub use error::CoreError;
pub use event::{Event, EventState};
pub use seqnum::SeqNum;
pub use worker::{WorkerId, WorkerState};
