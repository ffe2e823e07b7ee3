// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker table.
//!
//! Grounded in `worker_new()` / `worker_free()` / `manager_workers_free()` /
//! `manager_kill_workers()` in the original supervisor
//! (`original_source/src/udev/udevd.c`). The original keeps workers in a
//! pid-keyed hashmap and a `struct worker.event` back-pointer; here the
//! pool owns a `Vec<PoolWorker<C>>` and each worker holds a non-owning
//! `Option<SeqNum>` back-reference, mirroring the owning/non-owning split
//! already used between `EventQueue` and `Event::worker`.

use std::collections::HashMap;
use tracing::{debug, warn};
use udevd_core::{Device, SeqNum, WorkerId, WorkerState};

use crate::error::PoolError;

/// A worker's side of its control channel to the main process.
///
/// The pool crate stays free of any particular transport (netlink socket,
/// Unix datagram, in-process mpsc) by depending only on this trait; the
/// daemon binary supplies the concrete implementation.
pub trait WorkerChannel: Send + Sync {
    /// Hand a device to the worker for processing. `false` means the
    /// worker did not accept the message and must be killed.
    fn send(&self, device: &Device) -> bool;

    /// Terminate the worker. Mirrors `kill(pid, SIGTERM | SIGKILL)`.
    fn kill(&self, force: bool);
}

/// One entry in the pool: a worker's channel plus its bookkeeping state.
pub struct PoolWorker<C> {
    pub id: WorkerId,
    pub channel: C,
    pub state: WorkerState,
    /// Non-owning back-reference to the event currently attached, if any.
    pub event: Option<SeqNum>,
}

/// The set of live (or recently killed, not yet reaped) worker processes.
pub struct WorkerPool<C> {
    workers: HashMap<WorkerId, PoolWorker<C>>,
}

impl<C: WorkerChannel> WorkerPool<C> {
    pub fn new() -> Self {
        Self { workers: HashMap::new() }
    }

    /// Number of workers still tracked, including killed-but-not-reaped
    /// ones — matches `hashmap_size(manager->workers)` in the original,
    /// which is only decremented by `worker_free` on reap.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn get(&self, id: WorkerId) -> Option<&PoolWorker<C>> {
        self.workers.get(&id)
    }

    /// Register a newly spawned worker as idle.
    pub fn insert(&mut self, id: WorkerId, channel: C) {
        self.workers.insert(id, PoolWorker { id, channel, state: WorkerState::Idle, event: None });
    }

    /// Find the first idle worker willing to accept `device`.
    ///
    /// Unresponsive idle workers found along the way are killed and
    /// skipped rather than returned, mirroring `event_run`'s behavior of
    /// trying the next one in the hashmap iteration.
    pub fn try_dispatch_to_idle(&mut self, seqnum: SeqNum, device: &Device) -> Option<WorkerId> {
        let idle_ids: Vec<WorkerId> =
            self.workers.values().filter(|w| w.state == WorkerState::Idle).map(|w| w.id).collect();

        for id in idle_ids {
            let accepted = match self.workers.get(&id) {
                Some(w) => w.channel.send(device),
                None => continue,
            };
            if !accepted {
                warn!(worker = ?id, "worker did not accept message, killing it");
                if let Some(w) = self.workers.get_mut(&id) {
                    w.channel.kill(true);
                    w.state = WorkerState::Killed;
                }
                continue;
            }
            if let Some(w) = self.workers.get_mut(&id) {
                w.state = WorkerState::Running;
                w.event = Some(seqnum);
            }
            return Some(id);
        }
        None
    }

    /// Mark a worker idle again and clear its event back-reference, e.g.
    /// after it reports completion. A `Killed` worker is left untouched —
    /// it is terminal and forbidden from reuse (spec.md §3), matching
    /// `if (worker->state != WORKER_KILLED) worker->state = WORKER_IDLE;`
    /// in the original (`original_source/src/udev/udevd.c:884`). Its
    /// event back-reference is still cleared so the caller can free the
    /// event even though the worker itself stays `Killed`.
    pub fn mark_idle(&mut self, id: WorkerId) -> Result<(), PoolError> {
        let worker = self.workers.get_mut(&id).ok_or(PoolError::UnknownWorker(id))?;
        if worker.state != WorkerState::Killed {
            worker.state = WorkerState::Idle;
        }
        worker.event = None;
        Ok(())
    }

    /// Forcibly kill one worker, e.g. on event timeout.
    pub fn kill(&mut self, id: WorkerId, force: bool) -> Result<(), PoolError> {
        let worker = self.workers.get_mut(&id).ok_or(PoolError::UnknownWorker(id))?;
        worker.channel.kill(force);
        worker.state = WorkerState::Killed;
        Ok(())
    }

    /// Signal every worker not already killed to terminate. Used at
    /// shutdown; mirrors `manager_kill_workers`.
    pub fn kill_all(&mut self) {
        for worker in self.workers.values_mut() {
            if worker.state == WorkerState::Killed {
                continue;
            }
            worker.channel.kill(false);
            worker.state = WorkerState::Killed;
        }
    }

    /// Remove a worker that has been reaped (its pid waited on). Returns
    /// the event it was attached to, if any, so the caller can free that
    /// event from the queue.
    pub fn reap(&mut self, id: WorkerId) -> Option<SeqNum> {
        let worker = self.workers.remove(&id)?;
        debug!(worker = ?id, "worker reaped");
        worker.event
    }
}

impl<C: WorkerChannel> Default for WorkerPool<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
