// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The queued/running uevent record.
//!
//! Timer handles are deliberately not stored inline here (see DESIGN.md):
//! they are runtime objects (tokio task handles) owned by the timeout
//! manager in `udevd-pool`, keyed by [`SeqNum`]. `Event` only carries the
//! data the busy predicate and the dispatcher need, plus a non-owning
//! back-reference to the worker it is attached to.

use crate::device::{Device, DevNum};
use crate::seqnum::SeqNum;
use crate::worker::WorkerId;

/// Lifecycle state of a queued event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    Queued,
    Running,
}

/// One pending (or running) uevent, plus the cached identity keys the
/// ordering algorithm needs.
#[derive(Debug, Clone)]
pub struct Event {
    /// The live device view. May be consulted by rule-application but is
    /// never mutated by the queue itself.
    pub device: Device,
    /// Pristine kernel view, retained so a crashed worker's event can be
    /// republished unmodified on reap.
    pub device_kernel: Device,
    pub state: EventState,

    // Cached identity keys (mirrors of `device`'s fields at insert time).
    pub seqnum: SeqNum,
    pub devpath: String,
    pub devpath_old: Option<String>,
    pub devnum: DevNum,
    pub ifindex: Option<u32>,
    pub is_block: bool,

    /// Seqnum of the latest event observed to block this one. `SeqNum::NONE`
    /// means "no known blocker". Monotone non-decreasing and never exceeds
    /// `seqnum`.
    pub delaying_seqnum: SeqNum,

    /// Non-owning back-reference to the worker this event is attached to.
    /// `Some` iff `state == Running`.
    pub worker: Option<WorkerId>,
}

impl Event {
    /// Build a freshly queued event from a kernel device.
    ///
    /// The kernel view is cloned before any rule processing can mutate
    /// `device`, so it can be replayed verbatim on worker failure.
    pub fn new(device: Device) -> Self {
        let device_kernel = device.clone();
        Self {
            seqnum: device.seqnum,
            devpath: device.devpath.clone(),
            devpath_old: device.devpath_old.clone(),
            devnum: device.devnum,
            ifindex: device.ifindex,
            is_block: device.is_block(),
            device,
            device_kernel,
            state: EventState::Queued,
            delaying_seqnum: SeqNum::NONE,
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, EventState::Running)
    }

    /// Attach this event to a worker, transitioning it to `Running`.
    ///
    /// Caller (the pool/dispatcher) is responsible for arming the two
    /// timers; this method only updates the data-model invariant.
    pub fn attach(&mut self, worker: WorkerId) {
        self.worker = Some(worker);
        self.state = EventState::Running;
    }

    /// Record a newly discovered blocker, enforcing monotonicity: the
    /// cached blocker never decreases.
    pub fn set_delaying_seqnum(&mut self, candidate: SeqNum) {
        if candidate > self.delaying_seqnum {
            self.delaying_seqnum = candidate;
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
