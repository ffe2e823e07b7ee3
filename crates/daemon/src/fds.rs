// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pre-opened file descriptor handshake (spec.md §6).
//!
//! The original supervisor accepts a control socket and a kernel netlink
//! socket handed in by a service manager (`sd_listen_fds`-style socket
//! activation) and treats any other combination of inherited descriptors
//! as a fatal init error.
//!
//! **Disclosed deviation**: adopting an externally-passed raw descriptor
//! requires `FromRawFd`/`BorrowedFd::borrow_raw`, both `unsafe fn`s, and
//! this workspace carries `unsafe_code = "forbid"` (see root `Cargo.toml`,
//! grounded in the teacher's own lint table). Rather than weaken that
//! lint for one feature, this module only *detects and reports* an
//! inherited-descriptor handshake; the daemon always binds its own
//! control socket and its own kernel netlink socket (`adapters::control`,
//! `adapters::netlink`). See `DESIGN.md` for the full rationale.

use tracing::warn;

/// What `LISTEN_FDS`/`LISTEN_PID` claim about inherited descriptors, if
/// anything. Logged at startup; never acted on (see module docs).
pub fn report_inherited_fds() {
    let Ok(count) = std::env::var("LISTEN_FDS") else { return };
    let matches_us = std::env::var("LISTEN_PID")
        .ok()
        .and_then(|pid| pid.parse::<u32>().ok())
        .is_some_and(|pid| pid == std::process::id());

    if !matches_us {
        return;
    }
    warn!(
        count,
        "service manager passed pre-opened descriptors via LISTEN_FDS; \
         this build does not adopt them (requires unsafe fd ownership, \
         forbidden by workspace lints) and will bind its own control and \
         netlink sockets instead"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn does_not_panic_without_listen_fds_set() {
        report_inherited_fds();
    }
}
