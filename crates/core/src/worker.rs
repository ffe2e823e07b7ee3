// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identifier and lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A worker is identified by its OS pid. Pids are only unique while the
/// process is live: a worker is considered in the pool iff its pid is
/// live (not yet reaped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub u32);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WorkerId {
    fn from(pid: u32) -> Self {
        Self(pid)
    }
}

/// Lifecycle state of a pool worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Has an event attached and is processing it.
    Running,
    /// No event attached; eligible for dispatch.
    Idle,
    /// Soft-terminated or hard-killed; forbidden from reuse, awaiting reap.
    Killed,
}
