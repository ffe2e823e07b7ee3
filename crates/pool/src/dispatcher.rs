// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decides whether a runnable event reuses an idle worker, spawns a new
//! one, or stays queued until a worker frees up.
//!
//! Grounded in `event_run()` (`original_source/src/udev/udevd.c:533-563`).

use tracing::debug;
use udevd_core::{Device, Event, WorkerId};

use crate::error::PoolError;
use crate::pool::{WorkerChannel, WorkerPool};

/// Supplies the one operation the dispatcher cannot provide itself:
/// actually starting a new worker process. The daemon binary wires this
/// to `tokio::process::Command`; tests wire it to an in-memory fake.
pub trait WorkerSpawner<C: WorkerChannel> {
    fn spawn(&mut self, device: &Device) -> Result<(WorkerId, C), PoolError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handed to an already-running idle worker.
    Reused(WorkerId),
    /// A fresh worker process was started for this event.
    Spawned(WorkerId),
    /// The pool is at `children_max`; the event stays queued.
    AtCapacity,
}

pub struct Dispatcher {
    pub children_max: usize,
}

impl Dispatcher {
    pub fn new(children_max: usize) -> Self {
        Self { children_max }
    }

    /// Attempt to run `event`. On success, the caller is responsible for
    /// calling `EventQueue::attach` with the returned worker id.
    pub fn dispatch<C, S>(
        &self,
        pool: &mut WorkerPool<C>,
        spawner: &mut S,
        event: &Event,
    ) -> Result<DispatchOutcome, PoolError>
    where
        C: WorkerChannel,
        S: WorkerSpawner<C>,
    {
        if let Some(id) = pool.try_dispatch_to_idle(event.seqnum, &event.device) {
            return Ok(DispatchOutcome::Reused(id));
        }

        if pool.len() >= self.children_max {
            if self.children_max > 1 {
                debug!(limit = self.children_max, "maximum number of children reached");
            }
            return Ok(DispatchOutcome::AtCapacity);
        }

        let (id, channel) = spawner.spawn(&event.device)?;
        pool.insert(id, channel);
        pool.try_dispatch_to_idle(event.seqnum, &event.device)
            .map(DispatchOutcome::Spawned)
            .ok_or(PoolError::UnknownWorker(id))
    }
}

/// Default `children_max`, used when not set by the kernel command line,
/// config file, or `-c`/`--children-max`.
///
/// `8 + 8 * cpus`, clamped to `[10, physical_memory / 128MiB]`.
pub fn children_max_default() -> usize {
    let cpus = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    let mut children_max = 8 + cpus * 8;

    let mem_limit = physical_memory_bytes().map(|bytes| (bytes / (128 * 1024 * 1024)) as usize);
    if let Some(mem_limit) = mem_limit {
        children_max = children_max.clamp(10, mem_limit.max(10));
    } else {
        children_max = children_max.max(10);
    }
    children_max
}

/// Total physical memory, read from `/proc/meminfo`. Returns `None` off
/// Linux or if the file is unreadable, in which case the caller falls
/// back to the CPU-only estimate.
fn physical_memory_bytes() -> Option<u64> {
    let contents = std::fs::read_to_string("/proc/meminfo").ok()?;
    let line = contents.lines().find(|l| l.starts_with("MemTotal:"))?;
    let kib: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kib * 1024)
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
