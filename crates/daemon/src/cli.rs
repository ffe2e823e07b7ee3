// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line flags.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "udevd", version, about = "Userspace device-event supervisor")]
pub struct Cli {
    /// Detach and run in the background.
    #[arg(short = 'd', long = "daemon")]
    pub daemon: bool,

    /// Raise the log level to debug.
    #[arg(short = 'D', long = "debug")]
    pub debug: bool,

    /// Maximum number of concurrent worker processes.
    #[arg(short = 'c', long = "children-max")]
    pub children_max: Option<usize>,

    /// Seconds to wait before acting on a newly queued event.
    #[arg(short = 'e', long = "exec-delay")]
    pub exec_delay: Option<u64>,

    /// Seconds before a running event is forcibly killed.
    #[arg(short = 't', long = "event-timeout")]
    pub event_timeout: Option<u64>,

    /// Device name resolution timing: "early" or "late".
    #[arg(short = 'N', long = "resolve-names")]
    pub resolve_names: Option<String>,
}
