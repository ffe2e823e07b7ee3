// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to acquire singleton lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("queue error: {0}")]
    Queue(#[from] udevd_queue::QueueError),

    #[error("pool error: {0}")]
    Pool(#[from] udevd_pool::PoolError),

    #[error("rule engine error: {0}")]
    Rules(#[from] udevd_ports::RuleEngineError),

    #[error("netlink monitor error: {0}")]
    Monitor(#[from] udevd_ports::MonitorError),

    #[error("control channel error: {0}")]
    Control(#[from] udevd_ports::ControlError),

    #[error("inotify error: {0}")]
    Watch(#[from] udevd_ports::WatchError),

    #[error("shutdown watchdog expired after 30s")]
    ShutdownTimeout,
}
