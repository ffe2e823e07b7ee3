// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's single immutable configuration struct.
//!
//! Built once at startup from, in increasing precedence: compiled-in
//! defaults, the kernel command line (`udev.*` keys), then CLI flags.
//! Mutation after startup is confined to the control-channel handler,
//! which only ever updates the in-memory copies the supervisor holds
//! (`children_max`, log level, property overrides) — this struct itself
//! is never mutated in place, matching the "config is a single immutable
//! struct passed by reference" invariant.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::cmdline::CmdlineOverrides;
use udevd_pool::children_max_default;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveNames {
    Early,
    Late,
    Never,
}

impl ResolveNames {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "early" => Some(Self::Early),
            "late" => Some(Self::Late),
            "never" => Some(Self::Never),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub daemon: bool,
    pub debug: bool,
    pub children_max: usize,
    pub exec_delay: Duration,
    pub event_timeout: Duration,
    pub resolve_names: ResolveNames,
    pub run_dir: PathBuf,
}

impl Config {
    /// Merge compiled-in defaults, kernel cmdline overrides, and CLI
    /// flags (CLI wins) into one immutable snapshot.
    pub fn build(cli: &Cli, cmdline: &CmdlineOverrides) -> Self {
        let children_max = cli
            .children_max
            .or(cmdline.children_max)
            .unwrap_or_else(children_max_default);

        let exec_delay = cli.exec_delay.or(cmdline.exec_delay).unwrap_or(0);

        let event_timeout = cli.event_timeout.or(cmdline.event_timeout).unwrap_or(180);

        let resolve_names = cli
            .resolve_names
            .as_deref()
            .and_then(ResolveNames::parse)
            .unwrap_or(ResolveNames::Late);

        Self {
            daemon: cli.daemon,
            debug: cli.debug,
            children_max,
            exec_delay: Duration::from_secs(exec_delay),
            event_timeout: Duration::from_secs(event_timeout),
            resolve_names,
            run_dir: PathBuf::from("/run/udev"),
        }
    }

    pub fn queue_marker_path(&self) -> PathBuf {
        self.run_dir.join("queue")
    }

    pub fn control_socket_path(&self) -> PathBuf {
        self.run_dir.join("control")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
