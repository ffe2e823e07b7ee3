use super::*;
use std::cell::Cell;
use udevd_core::{Action, DevNum};

struct FakeChannel {
    accepts: bool,
    killed: Cell<bool>,
}

impl FakeChannel {
    fn accepting() -> Self {
        Self { accepts: true, killed: Cell::new(false) }
    }

    fn refusing() -> Self {
        Self { accepts: false, killed: Cell::new(false) }
    }
}

impl WorkerChannel for FakeChannel {
    fn send(&self, _device: &Device) -> bool {
        self.accepts
    }

    fn kill(&self, _force: bool) {
        self.killed.set(true);
    }
}

fn device() -> Device {
    Device {
        seqnum: SeqNum(1),
        devpath: "/devices/pci/sda".to_string(),
        devpath_old: None,
        devnum: DevNum::NONE,
        ifindex: None,
        subsystem: "block".to_string(),
        devtype: None,
        action: Action::Add,
        sysname: "sda".to_string(),
    }
}

#[test]
fn dispatches_to_idle_worker_and_attaches_event() {
    let mut pool: WorkerPool<FakeChannel> = WorkerPool::new();
    pool.insert(WorkerId(1), FakeChannel::accepting());

    let chosen = pool.try_dispatch_to_idle(SeqNum(7), &device());
    assert_eq!(chosen, Some(WorkerId(1)));
    let worker = pool.get(WorkerId(1)).unwrap();
    assert_eq!(worker.state, WorkerState::Running);
    assert_eq!(worker.event, Some(SeqNum(7)));
}

#[test]
fn unresponsive_idle_worker_is_killed_and_skipped() {
    let mut pool: WorkerPool<FakeChannel> = WorkerPool::new();
    pool.insert(WorkerId(1), FakeChannel::refusing());
    pool.insert(WorkerId(2), FakeChannel::accepting());

    let chosen = pool.try_dispatch_to_idle(SeqNum(7), &device());
    assert_eq!(chosen, Some(WorkerId(2)));
    assert_eq!(pool.get(WorkerId(1)).unwrap().state, WorkerState::Killed);
    assert!(pool.get(WorkerId(1)).unwrap().channel.killed.get());
}

#[test]
fn running_workers_are_not_offered_new_events() {
    let mut pool: WorkerPool<FakeChannel> = WorkerPool::new();
    pool.insert(WorkerId(1), FakeChannel::accepting());
    pool.try_dispatch_to_idle(SeqNum(1), &device());

    assert_eq!(pool.try_dispatch_to_idle(SeqNum(2), &device()), None);
}

#[test]
fn mark_idle_clears_event_back_reference() {
    let mut pool: WorkerPool<FakeChannel> = WorkerPool::new();
    pool.insert(WorkerId(1), FakeChannel::accepting());
    pool.try_dispatch_to_idle(SeqNum(1), &device());

    pool.mark_idle(WorkerId(1)).unwrap();
    let worker = pool.get(WorkerId(1)).unwrap();
    assert_eq!(worker.state, WorkerState::Idle);
    assert_eq!(worker.event, None);
}

#[test]
fn mark_idle_does_not_resurrect_a_killed_worker() {
    let mut pool: WorkerPool<FakeChannel> = WorkerPool::new();
    pool.insert(WorkerId(1), FakeChannel::accepting());
    pool.try_dispatch_to_idle(SeqNum(1), &device());
    pool.kill(WorkerId(1), true).unwrap();

    // A buffered completion message arrives after the kill decision.
    pool.mark_idle(WorkerId(1)).unwrap();
    let worker = pool.get(WorkerId(1)).unwrap();
    assert_eq!(worker.state, WorkerState::Killed);
    assert_eq!(worker.event, None);
}

#[test]
fn reap_removes_worker_and_returns_its_event() {
    let mut pool: WorkerPool<FakeChannel> = WorkerPool::new();
    pool.insert(WorkerId(1), FakeChannel::accepting());
    pool.try_dispatch_to_idle(SeqNum(9), &device());

    let event = pool.reap(WorkerId(1));
    assert_eq!(event, Some(SeqNum(9)));
    assert!(pool.is_empty());
}

#[test]
fn kill_all_marks_every_non_killed_worker_killed() {
    let mut pool: WorkerPool<FakeChannel> = WorkerPool::new();
    pool.insert(WorkerId(1), FakeChannel::accepting());
    pool.insert(WorkerId(2), FakeChannel::accepting());

    pool.kill_all();
    assert_eq!(pool.get(WorkerId(1)).unwrap().state, WorkerState::Killed);
    assert_eq!(pool.get(WorkerId(2)).unwrap().state, WorkerState::Killed);
}
