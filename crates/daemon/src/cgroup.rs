// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort cleanup of lingering processes in the manager's cgroup.
//!
//! Grounded in the final branch of `manager_exit`'s idle check in the
//! original supervisor (`original_source/src/udev/udevd.c`): once the
//! queue and worker pool are both empty and the manager is not exiting,
//! it kills anything left behind in its own cgroup (e.g. a worker's
//! grandchild that outlived its parent). Used by the idle/shutdown
//! policy in `manager.rs`.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

/// The manager's own cgroup path, read once at startup. `None` if the
/// process isn't in a cgroup v2 hierarchy (e.g. running under a test
/// harness or an older kernel) — callers treat that as "nothing to do".
#[derive(Debug, Clone)]
pub struct Cgroup {
    procs_path: std::path::PathBuf,
}

impl Cgroup {
    /// Resolve the caller's own cgroup v2 membership from
    /// `/proc/self/cgroup`. Returns `None` on any I/O or parse failure;
    /// this is a best-effort convenience, not a fatal-if-absent feature.
    pub fn own() -> Option<Self> {
        let contents = std::fs::read_to_string("/proc/self/cgroup").ok()?;
        // cgroup v2 lines look like "0::/user.slice/...". The unified
        // hierarchy always uses controller-list "" between the two colons.
        let rel = contents.lines().find_map(|line| {
            let mut parts = line.splitn(3, ':');
            let _id = parts.next()?;
            let controllers = parts.next()?;
            if !controllers.is_empty() {
                return None;
            }
            parts.next()
        })?;
        let procs_path =
            std::path::Path::new("/sys/fs/cgroup").join(rel.trim_start_matches('/')).join("cgroup.procs");
        Some(Self { procs_path })
    }

    /// SIGKILL every pid listed in `cgroup.procs` except `except_pid`
    /// (the manager itself). Errors reading the file or killing a pid
    /// that already exited are logged and swallowed — this runs only as
    /// a last-resort sweep during the idle/shutdown policy.
    pub fn kill_lingering(&self, except_pid: u32) {
        let contents = match std::fs::read_to_string(&self.procs_path) {
            Ok(c) => c,
            Err(err) => {
                debug!(%err, path = %self.procs_path.display(), "could not read cgroup.procs");
                return;
            }
        };
        for line in contents.lines() {
            let Ok(pid) = line.trim().parse::<i32>() else { continue };
            if pid as u32 == except_pid {
                continue;
            }
            if let Err(err) = signal::kill(Pid::from_raw(pid), Signal::SIGKILL) {
                warn!(pid, %err, "failed to kill lingering cgroup process");
            }
        }
    }
}
