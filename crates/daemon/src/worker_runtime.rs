// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-child worker runtime (spec.md §4.5).
//!
//! Entered when this binary is invoked with the hidden `--udevd-worker`
//! flag (see `spawn.rs`/`main.rs`). A worker is single-purpose: read one
//! device at a time from its private channel (here, stdin — see
//! `spawn.rs` for why), apply the rule engine, publish the processed
//! device, and signal completion, exactly as `worker_new()`'s forked
//! child loop does in the original supervisor
//! (`original_source/src/udev/udevd.c`).

use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use udevd_core::Device;
use udevd_ports::RuleEngine;

use crate::adapters::rules::PropertyOverrideRuleEngine;

/// Subsystems/sysname prefixes the original never takes an advisory lock
/// for, because something else (device-mapper, md, drbd) already owns
/// exclusive access semantics for these. Grounded in `shall_lock_device()`
/// (`original_source/src/udev/udevd.c`).
const NO_LOCK_PREFIXES: &[&str] = &["dm-", "md", "drbd"];

/// `O_RDONLY|O_NONBLOCK|O_NOFOLLOW|O_CLOEXEC`, matching the flags
/// `shall_lock_device`'s caller opens the node with.
const LOCK_OPEN_FLAGS: i32 = libc_like::O_NONBLOCK | libc_like::O_NOFOLLOW;

/// A handful of `open(2)` flag bits this workspace otherwise has no
/// dependency for (the `libc` crate isn't in the teacher's stack; these
/// three are stable across Linux and are the only ones the lock-open
/// path needs beyond what `std::fs::OpenOptions` exposes directly).
mod libc_like {
    pub const O_NONBLOCK: i32 = 0o4000;
    pub const O_NOFOLLOW: i32 = 0o400000;
}

pub struct WorkerConfig {
    pub event_timeout: Duration,
    pub exec_delay: Duration,
    pub properties: std::collections::HashMap<String, String>,
}

impl WorkerConfig {
    pub fn from_env() -> Self {
        let event_timeout = std::env::var("UDEVD_EVENT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(180));
        let exec_delay = std::env::var("UDEVD_EXEC_DELAY_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::ZERO);
        let properties = std::env::var("UDEVD_PROPERTIES")
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Self { event_timeout, exec_delay, properties }
    }
}

/// `true` when the node at `sysname` should be advisory-locked before
/// rule application, per spec.md §4.5 step 5.
fn shall_lock_device(subsystem: &str, sysname: &str) -> bool {
    subsystem == "block" && !NO_LOCK_PREFIXES.iter().any(|p| sysname.starts_with(p))
}

/// Resolve the device node to lock: the device's own node, or — for a
/// partition — its parent disk's node.
///
/// **Supplemented heuristic**: the original walks the real sysfs parent
/// symlink. This workspace has no sysfs to read (and none in tests), so
/// the parent is derived from the trailing digits of the partition's
/// sysname (`sda1` -> `sda`, `nvme0n1p1` -> `nvme0n1`), which matches the
/// kernel's own partition-naming convention closely enough to pick the
/// right lock target without a real sysfs tree.
fn lock_target_path(devtype: Option<&str>, sysname: &str) -> PathBuf {
    if devtype == Some("partition") {
        let parent = partition_parent_sysname(sysname);
        return Path::new("/dev").join(parent);
    }
    Path::new("/dev").join(sysname)
}

fn partition_parent_sysname(sysname: &str) -> String {
    let trimmed = sysname.trim_end_matches(|c: char| c.is_ascii_digit());
    // nvme/mmcblk-style names separate the partition number with a `p`.
    trimmed.strip_suffix('p').unwrap_or(trimmed).to_string()
}

/// Attempt the non-blocking shared advisory lock described in spec.md
/// §4.5 step 5. `Ok(None)` means "skip rule execution" (someone else
/// holds an exclusive lock); `Ok(Some(_))` carries the held lock, which
/// the caller releases (step 10) simply by dropping it.
fn try_lock(path: &Path) -> std::io::Result<Option<std::fs::File>> {
    let file = OpenOptions::new().read(true).custom_flags(LOCK_OPEN_FLAGS).open(path)?;
    match file.try_lock_shared() {
        Ok(()) => Ok(Some(file)),
        Err(_) => Ok(None),
    }
}

/// Run the worker loop until stdin closes or `SIGTERM` arrives. Returns
/// the process exit code.
pub async fn run() -> i32 {
    // NOTIFY_SOCKET is for the supervisor only.
    std::env::remove_var("NOTIFY_SOCKET");

    let config = WorkerConfig::from_env();
    let rules = PropertyOverrideRuleEngine::new();
    for (key, value) in &config.properties {
        rules.set_env(key.clone(), Some(value.clone()));
    }

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut stdout = tokio::io::stdout();

    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(s) => s,
        Err(err) => {
            warn!(%err, "failed to install SIGTERM handler");
            return 1;
        }
    };

    loop {
        let line = tokio::select! {
            biased;
            _ = sigterm.recv() => {
                info!("worker received SIGTERM, exiting");
                return 0;
            }
            line = lines.next_line() => line,
        };

        let Ok(Some(line)) = line else {
            debug!("worker stdin closed, exiting");
            return 0;
        };
        let Ok(mut device) = serde_json::from_str::<Device>(&line) else {
            warn!(%line, "worker received malformed device, skipping");
            continue;
        };

        process_one(&mut device, &rules, config.event_timeout, config.exec_delay).await;

        if let Ok(payload) = serde_json::to_string(&device) {
            let _ = stdout.write_all(payload.as_bytes()).await;
            let _ = stdout.write_all(b"\n").await;
        }
        let _ = stdout.write_all(b"OK\n").await;
        let _ = stdout.flush().await;
    }
}

/// Apply the execution context of spec.md §4.5 step 4 to one device: an
/// optional `exec-delay` pause (`-e/--exec-delay`, `udev.exec_delay=`)
/// before the advisory-lock-then-rules sequence begins.
async fn process_one(
    device: &mut Device,
    rules: &PropertyOverrideRuleEngine,
    event_timeout: Duration,
    exec_delay: Duration,
) {
    if !exec_delay.is_zero() {
        tokio::time::sleep(exec_delay).await;
    }

    let should_lock = device.action.as_str() != "remove" && shall_lock_device(&device.subsystem, &device.sysname);

    let _lock = if should_lock {
        let path = lock_target_path(device.devtype.as_deref(), &device.sysname);
        match try_lock(&path) {
            Ok(Some(lock)) => Some(lock),
            Ok(None) => {
                debug!(sysname = %device.sysname, "device is exclusively locked, skipping rule application");
                return;
            }
            Err(err) => {
                debug!(sysname = %device.sysname, %err, "could not open device node for locking");
                None
            }
        }
    } else {
        None
    };

    let outcome = tokio::time::timeout(event_timeout, rules.apply_to_event(device)).await;
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(devpath = %device.devpath, %err, "rule application failed"),
        Err(_) => warn!(devpath = %device.devpath, "rule application exceeded event timeout"),
    }
    // `_lock` drops here, releasing the advisory lock (step 10).
}
