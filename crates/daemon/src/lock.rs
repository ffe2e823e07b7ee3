// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Singleton instance lock.
//!
//! Same `fs2::FileExt::try_lock_exclusive` pattern the teacher uses for
//! its daemon PID file
//! (`examples/alfredjeanlab-oddjobs/crates/daemon/src/lifecycle/startup.rs`):
//! open without truncating, lock first, only then write the pid — so a
//! failed lock attempt never clobbers the running daemon's file.

use fs2::FileExt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::DaemonError;

/// Holds the lock for as long as it's alive; dropping it releases the
/// advisory lock (the kernel also releases it automatically on process
/// exit, but holding the handle keeps intent explicit).
pub struct InstanceLock {
    _file: File,
}

impl InstanceLock {
    pub fn acquire(pid_path: &Path) -> Result<Self, DaemonError> {
        if let Some(parent) = pid_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(pid_path)?;
        file.try_lock_exclusive().map_err(DaemonError::LockFailed)?;

        let mut file = file;
        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;

        Ok(Self { _file: file })
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
