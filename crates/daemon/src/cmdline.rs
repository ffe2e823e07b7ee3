// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kernel command-line overrides (`/proc/cmdline`'s `udev.*` keys).
//!
//! Grounded in `parse_proc_cmdline_item()`
//! (`original_source/src/udev/udevd.c:1345-1390`): `udev.log_priority=`,
//! `udev.children_max=`, `udev.event_timeout=`, `udev.exec_delay=`.
//! Unknown `udev.*` keys are logged and ignored, never treated as a fatal
//! parse error.

use std::collections::HashMap;
use tracing::warn;

/// Overrides parsed from the kernel command line. Every field is optional;
/// [`crate::config::Config::build`] only applies the ones present, at
/// lower precedence than an explicit CLI flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmdlineOverrides {
    pub log_priority: Option<String>,
    pub children_max: Option<usize>,
    pub event_timeout: Option<u64>,
    pub exec_delay: Option<u64>,
}

impl CmdlineOverrides {
    pub fn from_proc() -> Self {
        match std::fs::read_to_string("/proc/cmdline") {
            Ok(contents) => Self::parse(&contents),
            Err(err) => {
                warn!(%err, "could not read /proc/cmdline, kernel overrides disabled");
                Self::default()
            }
        }
    }

    pub fn parse(cmdline: &str) -> Self {
        let mut overrides = Self::default();
        for token in cmdline.split_whitespace() {
            let Some((key, value)) = token.split_once('=') else { continue };
            if !key.starts_with("udev.") {
                continue;
            }
            match key {
                "udev.log_priority" => overrides.log_priority = Some(value.to_string()),
                "udev.children_max" => match value.parse() {
                    Ok(n) => overrides.children_max = Some(n),
                    Err(_) => warn!(key, value, "ignoring malformed kernel cmdline override"),
                },
                "udev.event_timeout" => match value.parse() {
                    Ok(n) => overrides.event_timeout = Some(n),
                    Err(_) => warn!(key, value, "ignoring malformed kernel cmdline override"),
                },
                "udev.exec_delay" => match value.parse() {
                    Ok(n) => overrides.exec_delay = Some(n),
                    Err(_) => warn!(key, value, "ignoring malformed kernel cmdline override"),
                },
                other => warn!(key = other, "unknown udev.* kernel cmdline key, ignoring"),
            }
        }
        overrides
    }
}

/// Parse a single `KEY=value` control-channel/env payload, splitting on
/// the first `=` only (matches `udev_ctrl_get_set_env`'s `strchr`, not
/// `rsplit`).
pub fn split_key_value(s: &str) -> Option<(&str, &str)> {
    s.split_once('=')
}

/// Environment overrides a worker process inherits, built from the
/// originating command line plus any `SET_ENV` control messages applied
/// since startup.
pub type PropertyOverrides = HashMap<String, String>;

#[cfg(test)]
#[path = "cmdline_tests.rs"]
mod tests;
