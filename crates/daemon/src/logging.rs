// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup: `tracing` + `tracing-subscriber`, with a reloadable
//! level so `SET_LOG_LEVEL` control messages take effect without a
//! restart (mirrors `log_set_max_level()` in `on_ctrl_msg()`). Besides
//! the interactive stderr layer, a daily-rolling file layer under the
//! run directory gives a persistent trail a service manager's own
//! journal may not retain.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::reload;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub type LogHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

/// Install the global subscriber. Returns a handle the control-channel
/// handler uses to change the level at runtime, plus the file-appender
/// guard the caller must keep alive for the process lifetime (dropping
/// it stops flushing buffered lines to disk).
pub fn init(debug: bool, run_dir: &Path) -> (LogHandle, WorkerGuard) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let (filter, handle) = reload::Layer::new(filter);

    let file_appender = tracing_appender::rolling::daily(run_dir, "udevd.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_target(false).with_ansi(false).with_writer(file_writer))
        .init();

    (handle, guard)
}

/// Apply a new log level, e.g. from a `SET_LOG_LEVEL` control message.
/// `priority` follows syslog numbering (0 = emerg … 7 = debug), matching
/// `log_set_max_level(i)` in the original.
pub fn set_level(handle: &LogHandle, priority: u8) {
    let level = match priority {
        0..=3 => LevelFilter::ERROR,
        4 => LevelFilter::WARN,
        5 | 6 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let _ = handle.modify(|filter| *filter = EnvFilter::new(level.to_string()));
}
