// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point: assembles the real adapters and runs the supervisor
//! loop (spec.md §4.6), or — when invoked with the hidden
//! `--udevd-worker` flag — runs the per-child worker runtime instead
//! (spec.md §4.5). See `spawn.rs` for why one binary serves both roles.

mod adapters;
mod cgroup;
mod cli;
mod cmdline;
mod config;
mod error;
mod fds;
mod lock;
mod logging;
mod manager;
mod notify;
mod spawn;
mod synthetic;
mod worker_runtime;

use std::collections::HashMap;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};

use adapters::{NetlinkMonitorHandle, PropertyOverrideRuleEngine, RealInotify, UnixControlChannel};
use cli::Cli;
use cmdline::CmdlineOverrides;
use config::Config;
use error::DaemonError;
use lock::InstanceLock;
use manager::Manager;
use spawn::ProcessSpawner;
use udevd_pool::{Dispatcher, TimeoutManager, WorkerPool};
use udevd_queue::EventQueue;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--udevd-worker") {
        // Single-threaded worker: one device in flight at a time, no
        // benefit from a multi-threaded runtime.
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(err) => {
                eprintln!("udevd-worker: failed to start runtime: {err}");
                std::process::exit(1);
            }
        };
        let code = runtime.block_on(worker_runtime::run());
        std::process::exit(code);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("udevd: failed to start runtime: {err}");
            std::process::exit(1);
        }
    };
    let code = runtime.block_on(run_supervisor());
    std::process::exit(code);
}

async fn run_supervisor() -> i32 {
    let cli = Cli::parse();
    let cmdline = CmdlineOverrides::from_proc();
    let config = Config::build(&cli, &cmdline);

    if let Err(err) = ensure_run_dir(&config.run_dir) {
        eprintln!("udevd: failed to prepare {}: {err}", config.run_dir.display());
        return 1;
    }
    let (log_handle, _log_guard) = logging::init(cli.debug, &config.run_dir);
    fds::report_inherited_fds();

    match assemble_and_run(config, log_handle).await {
        Ok(code) => code,
        Err(err) => {
            error!(%err, "fatal error during startup");
            1
        }
    }
}

/// Create the run directory (spec.md §6: "`/run/udev/` must be creatable
/// (mode 0755)") before anything — including logging — touches it.
fn ensure_run_dir(run_dir: &std::path::Path) -> std::io::Result<()> {
    std::fs::create_dir_all(run_dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(run_dir)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(run_dir, perms)?;
    }
    Ok(())
}

async fn assemble_and_run(config: Config, log_handle: logging::LogHandle) -> Result<i32, DaemonError> {
    let _instance_lock = InstanceLock::acquire(&config.run_dir.join("udevd.pid"))?;

    let owning_pid = std::process::id();
    let queue = EventQueue::new(owning_pid, config.queue_marker_path());
    let pool = WorkerPool::new();
    let dispatcher = Dispatcher::new(config.children_max);
    let timeouts = TimeoutManager::new(udevd_core::SystemClock, config.event_timeout);

    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    let properties: HashMap<String, String> = HashMap::new();
    let worker_env = manager::worker_env(&config, &properties);
    let spawner = ProcessSpawner::new(worker_env, reply_tx)?;

    let monitor = NetlinkMonitorHandle::kernel()?;
    let inotify = RealInotify::new()?;
    let control = UnixControlChannel::bind(&config.control_socket_path())?;
    let rules = PropertyOverrideRuleEngine::new();

    let cgroup = cgroup::Cgroup::own();

    let mut manager = Manager {
        queue,
        pool,
        dispatcher,
        timeouts,
        spawner,
        monitor,
        inotify,
        control,
        rules,
        reply_rx,
        cgroup,
        properties,
        log_handle,
        stop_exec_queue: false,
        exit_requested: false,
        owning_pid,
        last_config_check: tokio::time::Instant::now(),
    };

    info!(
        children_max = config.children_max,
        event_timeout_secs = config.event_timeout.as_secs(),
        exec_delay_secs = config.exec_delay.as_secs(),
        "udevd starting"
    );
    notify::ready();
    notify::status("running");

    let code = manager.run().await;

    info!(code, "udevd exiting");
    Ok(code)
}

