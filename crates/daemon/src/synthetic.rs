// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synthetic "change" events for closed block devices (spec.md §4.7).
//!
//! Grounded in `on_inotify()`'s `IN_CLOSE_WRITE` handling in the original
//! supervisor (`original_source/src/udev/udevd.c:1157ff`): closing a
//! watched block device node after a write may mean its partition table
//! changed, so the manager asks the kernel to reread it and, failing
//! that (or for non-disk devices), fabricates a uevent by writing the
//! literal string `change` to the device's `uevent` sysfs attribute.
//!
//! **Disclosed deviation**: the original issues `ioctl(fd, BLKRRPART)` to
//! request the reread. `nix`'s `ioctl_*!` macros generate `unsafe fn`s,
//! and this workspace forbids `unsafe` (see `fds.rs`). `try_reread` below
//! always reports "not confirmed", which is the conservative choice: it
//! always falls through to the write-`change` fallback path rather than
//! silently assuming the kernel already re-enumerated partitions.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// One block device's identity as seen by the synthetic-change logic.
/// A thin view over `udevd_core::Device`'s fields the policy needs.
#[derive(Debug, Clone)]
pub struct ClosedDevice<'a> {
    pub syspath: &'a Path,
    pub subsystem: &'a str,
    pub devtype: Option<&'a str>,
    pub sysname: &'a str,
}

/// Attempt a non-blocking exclusive lock + partition-table reread on a
/// disk's device node. Returns `true` only if the reread is known to have
/// succeeded *and* the kernel already re-enumerated partitions on its
/// own — see the module-level deviation note. Always `false` here.
fn try_reread(_node_path: &Path) -> bool {
    false
}

/// Write the literal string `change` to `<syspath>/uevent`, asking the
/// kernel to re-emit this device's uevent.
fn write_change(syspath: &Path) {
    let uevent_path = syspath.join("uevent");
    if let Err(err) = std::fs::write(&uevent_path, b"change") {
        warn!(path = %uevent_path.display(), %err, "failed to write synthetic change uevent");
    }
}

/// List immediate partition-child directories of a disk's syspath: any
/// subdirectory starting with the disk's own sysname (`sda` -> `sda1`,
/// `sda2`, ...), matching the kernel's sysfs convention of nesting
/// partition device directories under their parent disk.
fn partition_children(syspath: &Path, disk_sysname: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(syspath) else { return Vec::new() };
    entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_dir()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n != disk_sysname && n.starts_with(disk_sysname))
        })
        .collect()
}

/// Apply the §4.7 policy for one `IN_CLOSE_WRITE` notification.
pub fn handle_close_write(device: ClosedDevice<'_>, devnode_path: impl AsRef<Path>) {
    let is_whole_disk = device.subsystem == "block"
        && device.devtype == Some("disk")
        && !device.sysname.starts_with("dm-");

    if is_whole_disk {
        if try_reread(devnode_path.as_ref()) {
            let children = partition_children(device.syspath, device.sysname);
            if !children.is_empty() {
                debug!(
                    sysname = device.sysname,
                    "partition reread succeeded with existing children; kernel already emitted events"
                );
                return;
            }
        }
        write_change(device.syspath);
        for child in partition_children(device.syspath, device.sysname) {
            write_change(&child);
        }
        return;
    }

    write_change(device.syspath);
}

#[cfg(test)]
#[path = "synthetic_tests.rs"]
mod tests;
