// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The worker pool, its dispatch policy, and per-event timeout tracking.

pub mod dispatcher;
pub mod error;
pub mod pool;
pub mod timeout;

pub use dispatcher::{children_max_default, DispatchOutcome, Dispatcher, WorkerSpawner};
pub use error::PoolError;
pub use pool::{PoolWorker, WorkerChannel, WorkerPool};
pub use timeout::{TimeoutManager, TimeoutOutcome};
