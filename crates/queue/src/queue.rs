// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event queue and its device-topology ordering predicate.
//!
//! Grounded directly in `is_devpath_busy()` / `event_queue_insert()` /
//! `event_queue_cleanup()` in the original C supervisor
//! (`original_source/src/udev/udevd.c`).

use crate::error::QueueError;
use crate::marker::QueueMarker;
use std::path::PathBuf;
use udevd_core::{Device, Event, EventState, SeqNum, WorkerId};

/// Selects which events `cleanup` should discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupFilter {
    /// Every event, regardless of state. Used at shutdown.
    Any,
    /// Only events still waiting to run. Used when abandoning queued work
    /// on `manager_exit`.
    Queued,
}

/// Ordered collection of pending/running events.
///
/// Events remain in the queue for their entire lifetime — including while
/// `Running` — and are only removed by [`EventQueue::free`] or
/// [`EventQueue::cleanup`]. This mirrors the original: a worker's event is
/// only unlinked from the manager's list when the worker completes or is
/// reaped, not when it starts running.
pub struct EventQueue {
    events: Vec<Event>,
    owning_pid: u32,
    marker: QueueMarker,
}

impl EventQueue {
    pub fn new(owning_pid: u32, marker_path: impl Into<PathBuf>) -> Self {
        Self { events: Vec::new(), owning_pid, marker: QueueMarker::new(marker_path, owning_pid) }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn marker_path(&self) -> &std::path::Path {
        self.marker.path()
    }

    /// Insert a freshly received kernel device. Must only be called from
    /// the process that created the queue.
    pub fn insert(&mut self, caller_pid: u32, device: Device) -> Result<SeqNum, QueueError> {
        if caller_pid != self.owning_pid {
            return Err(QueueError::NotOwner { caller: caller_pid, owner: self.owning_pid });
        }
        let was_empty = self.events.is_empty();
        let seqnum = device.seqnum;
        self.events.push(Event::new(device));
        if was_empty {
            self.marker.create(caller_pid)?;
        }
        Ok(seqnum)
    }

    fn index_of(&self, seqnum: SeqNum) -> Option<usize> {
        self.events.iter().position(|e| e.seqnum == seqnum)
    }

    pub fn get(&self, seqnum: SeqNum) -> Option<&Event> {
        self.index_of(seqnum).map(|i| &self.events[i])
    }

    /// Find the most recently inserted event for a given device's
    /// `sysname`. Used by synthetic-change handling to recover a
    /// device's identity from a bare devnode path.
    pub fn find_by_sysname(&self, sysname: &str) -> Option<&Event> {
        self.events.iter().rev().find(|e| e.device.sysname == sysname)
    }

    /// Attach `seqnum` to `worker`, transitioning it to `Running`.
    pub fn attach(&mut self, seqnum: SeqNum, worker: WorkerId) -> bool {
        match self.index_of(seqnum) {
            Some(i) => {
                self.events[i].attach(worker);
                true
            }
            None => false,
        }
    }

    /// Free (remove) one event by seqnum, e.g. on worker completion or
    /// reap. Returns the removed event so the caller can inspect its
    /// pristine kernel clone for republish-on-failure.
    pub fn free(&mut self, caller_pid: u32, seqnum: SeqNum) -> Result<Option<Event>, QueueError> {
        let Some(idx) = self.index_of(seqnum) else {
            return Ok(None);
        };
        let event = self.events.remove(idx);
        if self.events.is_empty() {
            self.marker.remove(caller_pid)?;
        }
        Ok(Some(event))
    }

    /// Discard all events matching `filter`. Used at shutdown (`Any`) and
    /// when abandoning queued work on `manager_exit` (`Queued`).
    pub fn cleanup(&mut self, caller_pid: u32, filter: CleanupFilter) -> Result<Vec<Event>, QueueError> {
        let (removed, kept): (Vec<Event>, Vec<Event>) =
            self.events.drain(..).partition(|e| match filter {
                CleanupFilter::Any => true,
                CleanupFilter::Queued => e.state == EventState::Queued,
            });
        self.events = kept;
        if self.events.is_empty() && !removed.is_empty() {
            self.marker.remove(caller_pid)?;
        }
        Ok(removed)
    }

    /// The central device-topology ordering algorithm.
    ///
    /// Returns whether `seqnum` must wait for an earlier event to finish
    /// first. As a side effect, may cache the blocking seqnum in the
    /// event's `delaying_seqnum` (monotone, never decreasing).
    pub fn is_busy(&mut self, seqnum: SeqNum) -> bool {
        let Some(idx) = self.index_of(seqnum) else { return false };

        let this_seqnum = self.events[idx].seqnum;
        let delaying = self.events[idx].delaying_seqnum;
        let devnum = self.events[idx].devnum;
        let is_block = self.events[idx].is_block;
        let ifindex = self.events[idx].ifindex;
        let devpath_old = self.events[idx].devpath_old.clone();
        let devpath = self.events[idx].devpath.clone();

        let mut busy = false;
        let mut new_delaying = None;

        for other in &self.events {
            // 1. A later event already shadowed this one as a blocker; skip.
            if other.seqnum < delaying {
                continue;
            }
            // 2. The last-known blocker is still present.
            if other.seqnum == delaying {
                busy = true;
                break;
            }
            // 3. Reached self or later; earlier siblings can't block anymore.
            if other.seqnum >= this_seqnum {
                break;
            }
            // 4. Same device node.
            if !devnum.is_none() && devnum == other.devnum && is_block == other.is_block {
                busy = true;
                break;
            }
            // 5. Same network interface.
            if ifindex.is_some_and(|i| i > 0) && ifindex == other.ifindex {
                busy = true;
                break;
            }
            // 6. A rename collides with a prior user of that name.
            if let Some(old) = devpath_old.as_deref() {
                if old == other.devpath {
                    new_delaying = Some(other.seqnum);
                    busy = true;
                    break;
                }
            }
            // 7. Compare devpath prefixes.
            let common = devpath.len().min(other.devpath.len());
            if devpath.as_bytes()[..common] != other.devpath.as_bytes()[..common] {
                continue;
            }
            if devpath.len() == other.devpath.len() {
                // Identical sysfs path: names may have swapped for a
                // device-identity event, so defer the decision instead of
                // declaring busy, since the rename may just be a swap.
                if !devnum.is_none() || ifindex.is_some_and(|i| i > 0) {
                    continue;
                }
                new_delaying = Some(other.seqnum);
                busy = true;
                break;
            }
            if devpath.as_bytes().get(common) == Some(&b'/') {
                // `this` is a child of `other`.
                new_delaying = Some(other.seqnum);
                busy = true;
                break;
            }
            if other.devpath.as_bytes().get(common) == Some(&b'/') {
                // `this` is a parent of `other`.
                new_delaying = Some(other.seqnum);
                busy = true;
                break;
            }
        }

        if let Some(s) = new_delaying {
            self.events[idx].set_delaying_seqnum(s);
        }
        busy
    }

    /// Iterate queued events in insertion order and return the seqnums of
    /// those that are not busy — i.e. eligible to hand to the dispatcher.
    ///
    /// Does not itself attach anything; the caller (the supervisor) drives
    /// the dispatcher and calls [`EventQueue::attach`] on success.
    pub fn scan_runnable(&mut self) -> Vec<SeqNum> {
        let seqnums: Vec<SeqNum> = self.events.iter().map(|e| e.seqnum).collect();
        let mut runnable = Vec::new();
        for seqnum in seqnums {
            let Some(idx) = self.index_of(seqnum) else { continue };
            if self.events[idx].state != EventState::Queued {
                continue;
            }
            if !self.is_busy(seqnum) {
                runnable.push(seqnum);
            }
        }
        runnable
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
