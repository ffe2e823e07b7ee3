// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleEngineError {
    #[error("failed to load rule database: {0}")]
    Load(String),
    #[error("rule application failed for {devpath}: {reason}")]
    Apply { devpath: String, reason: String },
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("netlink socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("monitor has no outbound peer configured")]
    NoPeer,
}

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("control channel I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed control message: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("inotify I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown watch descriptor {0}")]
    UnknownWatch(i32),
}
