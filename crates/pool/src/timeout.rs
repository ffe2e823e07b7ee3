// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-event warning and kill deadlines.
//!
//! Grounded in `worker_attach_event()`, `on_event_timeout_warning()` and
//! `on_event_timeout()` (`original_source/src/udev/udevd.c:230-285`). The
//! original arms two `sd-event` timer sources per running event; here a
//! single [`Clock`]-driven table replaces them so the policy can be unit
//! tested without real wall-clock delays, following the same testable-time
//! pattern as `udevd_core::clock`.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use udevd_core::{Clock, SeqNum, WorkerId};

/// What, if anything, a deadline sweep should do about a running event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutOutcome {
    /// Nothing due yet.
    Ok,
    /// The warning deadline passed; log it but keep the worker running.
    Warn,
    /// The kill deadline passed; the worker must be sent `SIGKILL`.
    Kill(WorkerId),
}

struct Deadlines {
    worker: WorkerId,
    warn_at: Instant,
    kill_at: Instant,
    warned: bool,
}

/// Tracks the warn/kill deadlines for every running event.
pub struct TimeoutManager<C: Clock> {
    clock: C,
    event_timeout: Duration,
    deadlines: HashMap<SeqNum, Deadlines>,
}

impl<C: Clock> TimeoutManager<C> {
    /// `event_timeout` is the full budget; the warning fires at a third of
    /// it, matching `worker_attach_event`'s `usec / 3`.
    pub fn new(clock: C, event_timeout: Duration) -> Self {
        Self { clock, event_timeout, deadlines: HashMap::new() }
    }

    /// Arm both deadlines for a newly attached event.
    pub fn arm(&mut self, seqnum: SeqNum, worker: WorkerId) {
        let now = self.clock.now();
        self.deadlines.insert(
            seqnum,
            Deadlines {
                worker,
                warn_at: now + self.event_timeout / 3,
                kill_at: now + self.event_timeout,
                warned: false,
            },
        );
    }

    /// Disarm on completion or reap.
    pub fn disarm(&mut self, seqnum: SeqNum) {
        self.deadlines.remove(&seqnum);
    }

    /// Check one event's deadlines against the current time. Does not
    /// disarm on `Kill`; the caller disarms once the worker is confirmed
    /// killed and reaped.
    pub fn check(&mut self, seqnum: SeqNum) -> TimeoutOutcome {
        let now = self.clock.now();
        let Some(deadline) = self.deadlines.get_mut(&seqnum) else {
            return TimeoutOutcome::Ok;
        };
        if now >= deadline.kill_at {
            return TimeoutOutcome::Kill(deadline.worker);
        }
        if !deadline.warned && now >= deadline.warn_at {
            deadline.warned = true;
            return TimeoutOutcome::Warn;
        }
        TimeoutOutcome::Ok
    }

    /// The nearest upcoming deadline across every armed event — the next
    /// not-yet-delivered warning, or the kill deadline for events already
    /// warned. `None` when nothing is armed. Lets the supervisor loop sleep
    /// until there is actually something to sweep instead of only checking
    /// deadlines opportunistically on ingress.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines
            .values()
            .map(|d| if d.warned { d.kill_at } else { d.warn_at })
            .min()
    }

    /// Sweep every armed event, returning the ones with something due.
    /// Driven by the supervisor loop's idle/periodic tick.
    pub fn sweep(&mut self) -> Vec<(SeqNum, TimeoutOutcome)> {
        let seqnums: Vec<SeqNum> = self.deadlines.keys().copied().collect();
        seqnums
            .into_iter()
            .filter_map(|seqnum| match self.check(seqnum) {
                TimeoutOutcome::Ok => None,
                outcome => Some((seqnum, outcome)),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "timeout_tests.rs"]
mod tests;
