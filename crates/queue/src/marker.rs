// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `/run/udev/queue` presence marker.
//!
//! Creation/removal is encapsulated here so the "only the originating pid
//! touches the marker" invariant can't be violated by an accidental fork
//! path elsewhere in the process.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// Owns the lifecycle of the queue marker file.
pub struct QueueMarker {
    path: PathBuf,
    owning_pid: u32,
    present: bool,
}

impl QueueMarker {
    /// `owning_pid` should be the pid that will call `create`/`remove` — in
    /// production this is always `std::process::id()`, captured once at
    /// queue construction so a worker forked later can't touch it even if
    /// it somehow retained a handle.
    pub fn new(path: impl Into<PathBuf>, owning_pid: u32) -> Self {
        Self { path: path.into(), owning_pid, present: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Called on an empty→nonempty queue transition.
    pub fn create(&mut self, caller_pid: u32) -> io::Result<()> {
        if caller_pid != self.owning_pid || self.present {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).write(true).truncate(true).open(&self.path)?;
        self.present = true;
        Ok(())
    }

    /// Called on a nonempty→empty queue transition.
    pub fn remove(&mut self, caller_pid: u32) -> io::Result<()> {
        if caller_pid != self.owning_pid || !self.present {
            return Ok(());
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        self.present = false;
        Ok(())
    }
}

#[cfg(test)]
#[path = "marker_tests.rs"]
mod tests;
