// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sd_notify`-style service-manager readiness reporting.
//!
//! Grounded in spec.md §6 ("`NOTIFY_SOCKET` is honored by the supervisor
//! (readiness, stopping, status text) and explicitly cleared in
//! workers"). This is the notify-protocol subset `systemd`'s
//! `sd_notify(3)` defines: a single datagram of `KEY=VALUE\n` lines sent
//! to the abstract or filesystem Unix socket named by `$NOTIFY_SOCKET`.

use std::os::unix::net::UnixDatagram;
use tracing::debug;

/// Send one or more `KEY=VALUE` status lines to the service manager, if
/// `NOTIFY_SOCKET` is set. Silently does nothing otherwise (e.g. running
/// interactively, or under a test harness).
pub fn notify(message: &str) {
    let Ok(path) = std::env::var("NOTIFY_SOCKET") else { return };
    // Abstract-namespace socket names (a leading '@') aren't reachable
    // through `std::os::unix::net::UnixDatagram::connect`, which rejects
    // paths containing an embedded NUL; only the filesystem-path form is
    // supported here.
    if path.is_empty() || path.starts_with('@') {
        return;
    }

    let result = (|| -> std::io::Result<()> {
        let socket = UnixDatagram::unbound()?;
        socket.connect(&path)?;
        socket.send(message.as_bytes())?;
        Ok(())
    })();
    if let Err(err) = result {
        debug!(%err, "failed to notify service manager");
    }
}

pub fn ready() {
    notify("READY=1");
}

pub fn stopping() {
    notify("STOPPING=1");
}

pub fn status(text: &str) {
    notify(&format!("STATUS={text}"));
}
