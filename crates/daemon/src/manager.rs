// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The central supervisor loop (spec.md §4.6, §4.8, §4.9).
//!
//! Grounded in the `manager_run`/`event_queue_cleanup`/`manager_exit`/
//! `manager_reload` cluster in the original supervisor
//! (`original_source/src/udev/udevd.c`). One `tokio::select!`, `biased;`
//! so branches are polled top-to-bottom in the order listed, matching the
//! original's single-threaded `sd-event` priority levels: signals first,
//! then worker replies, then kernel uevents, then inotify, and the
//! control channel last at idle priority — exactly spec.md §4.6's
//! ordering.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, info_span, warn, Instrument};

use udevd_core::Device;
use udevd_pool::{DispatchOutcome, Dispatcher, TimeoutManager, TimeoutOutcome, WorkerPool};
use udevd_ports::{ControlChannel, ControlMessage, Inotify, NetlinkMonitor, RuleEngine, WatchEvent};
use udevd_queue::{CleanupFilter, EventQueue};

use crate::cgroup::Cgroup;
use crate::logging::LogHandle;
use crate::spawn::{ChildHandle, ProcessSpawner, WorkerEnv, WorkerReplyMsg};
use crate::synthetic::{self, ClosedDevice};

/// How long the queue must stay empty with no workers left before the
/// idle-kill timer fires (spec.md §4.8).
const IDLE_KILL_DELAY: Duration = Duration::from_secs(3);

/// How long `manager_exit` waits for the loop to settle before forcing
/// exit with a timeout error (spec.md §4.6, §5).
const SHUTDOWN_WATCHDOG: Duration = Duration::from_secs(30);

/// How often `scan_and_dispatch` is willing to ask the rule engine
/// whether it's stale, matching `last_config_check_usec`'s 3-second
/// throttle in the original (spec.md §4.9).
const CONFIG_CHECK_INTERVAL: Duration = Duration::from_secs(3);

/// Resolves to the given instant, or never, when `at` is `None` — lets
/// the idle-kill and shutdown-watchdog timers sit as ordinary `select!`
/// branches without juggling guards over moved-from `Option<Sleep>`s.
async fn sleep_until_opt(at: Option<tokio::time::Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Everything the supervisor needs to run one instance, assembled by
/// `main.rs` from real adapters.
pub struct Manager<M, I, C, R>
where
    M: NetlinkMonitor,
    I: Inotify,
    C: ControlChannel,
    R: RuleEngine,
{
    pub queue: EventQueue,
    pub pool: WorkerPool<ChildHandle>,
    pub dispatcher: Dispatcher,
    pub timeouts: TimeoutManager<udevd_core::SystemClock>,
    pub spawner: ProcessSpawner,
    pub monitor: M,
    pub inotify: I,
    pub control: C,
    pub rules: R,
    pub reply_rx: UnboundedReceiver<WorkerReplyMsg>,
    pub cgroup: Option<Cgroup>,
    pub properties: HashMap<String, String>,
    pub log_handle: LogHandle,
    pub stop_exec_queue: bool,
    pub exit_requested: bool,
    pub owning_pid: u32,
    pub last_config_check: tokio::time::Instant,
}

impl<M, I, C, R> Manager<M, I, C, R>
where
    M: NetlinkMonitor,
    I: Inotify,
    C: ControlChannel,
    R: RuleEngine,
{
    /// Run until a clean shutdown or the watchdog fires. Returns the
    /// process exit code (spec.md §6: non-zero on watchdog).
    pub async fn run(&mut self) -> i32 {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(err) => {
                warn!(%err, "failed to install SIGTERM handler");
                return 1;
            }
        };
        let mut sigint = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()) {
            Ok(s) => s,
            Err(err) => {
                warn!(%err, "failed to install SIGINT handler");
                return 1;
            }
        };
        let mut sighup = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup()) {
            Ok(s) => s,
            Err(err) => {
                warn!(%err, "failed to install SIGHUP handler");
                return 1;
            }
        };

        let mut idle_kill_at: Option<tokio::time::Instant> = None;
        let mut watchdog_at: Option<tokio::time::Instant> = None;
        let mut timeout_sweep_at: Option<tokio::time::Instant> = None;

        loop {
            tokio::select! {
                biased;

                _ = sigterm.recv() => {
                    info!("received SIGTERM, shutting down");
                    self.begin_exit(&mut watchdog_at);
                }
                _ = sigint.recv() => {
                    info!("received SIGINT, shutting down");
                    self.begin_exit(&mut watchdog_at);
                }
                _ = sighup.recv() => {
                    info!("received SIGHUP, reloading");
                    self.reload().await;
                }

                Some(reply) = self.reply_rx.recv() => {
                    self.handle_worker_reply(reply).await;
                }

                result = self.monitor.receive(), if !self.exit_requested => {
                    match result {
                        Ok(device) => self.handle_uevent(device).await,
                        Err(err) => warn!(%err, "netlink monitor receive failed"),
                    }
                }

                result = self.inotify.read_events() => {
                    match result {
                        Ok(events) => self.handle_inotify_events(events).await,
                        Err(err) => warn!(%err, "inotify read failed"),
                    }
                }

                result = self.control.accept() => {
                    match result {
                        Ok(()) => self.drain_control_messages().await,
                        Err(err) => warn!(%err, "control channel accept failed"),
                    }
                }

                () = sleep_until_opt(idle_kill_at) => {
                    info!("idle timeout, terminating all workers");
                    self.pool.kill_all();
                    idle_kill_at = None;
                }

                () = sleep_until_opt(watchdog_at) => {
                    warn!("shutdown watchdog expired, forcing exit");
                    return 1;
                }

                () = sleep_until_opt(timeout_sweep_at) => {
                    self.scan_and_dispatch().await;
                }
            }

            timeout_sweep_at =
                self.timeouts.next_deadline().map(tokio::time::Instant::from_std);

            if let Some(code) = self.post_loop_hook(&mut idle_kill_at) {
                return code;
            }
        }
    }

    fn begin_exit(&mut self, watchdog_at: &mut Option<tokio::time::Instant>) {
        if self.exit_requested {
            return;
        }
        self.exit_requested = true;
        crate::notify::stopping();
        let _ = self.queue.cleanup(self.owning_pid, CleanupFilter::Queued);
        self.pool.kill_all();
        *watchdog_at = Some(tokio::time::Instant::now() + SHUTDOWN_WATCHDOG);
    }

    async fn reload(&mut self) {
        self.pool.kill_all();
        if let Err(err) = self.rules.load().await {
            warn!(%err, "rule reload failed, keeping previously loaded rules");
        }
    }

    async fn handle_uevent(&mut self, device: Device) {
        let span =
            info_span!("uevent", seqnum = device.seqnum.0, devpath = %device.devpath, action = %device.action);
        async {
            match self.queue.insert(self.owning_pid, device) {
                Ok(seqnum) => debug!(?seqnum, "inserted event"),
                Err(err) => warn!(%err, "failed to insert event"),
            }
            self.scan_and_dispatch().await;
        }
        .instrument(span)
        .await;
    }

    async fn handle_inotify_events(&mut self, events: Vec<WatchEvent>) {
        for event in events {
            if let WatchEvent::CloseWrite(wd) = event {
                if let Some(devnode) = self.inotify.resolve(wd).map(str::to_string) {
                    self.synthesize_change(&devnode);
                }
            }
            // `Ignored` watches need no further action: the kernel has
            // already dropped them.
        }
        self.scan_and_dispatch().await;
    }

    fn synthesize_change(&self, devnode: &str) {
        let Some(device) = self.lookup_device_by_devnode(devnode) else { return };
        let syspath = std::path::PathBuf::from(format!("/sys{}", device.devpath));
        synthetic::handle_close_write(
            ClosedDevice {
                syspath: &syspath,
                subsystem: &device.subsystem,
                devtype: device.devtype.as_deref(),
                sysname: &device.sysname,
            },
            devnode,
        );
    }

    /// Best-effort lookup of the device behind a watched node, from the
    /// queue's own history.
    ///
    /// **Simplification**: the original resolves this through its
    /// persisted per-device udev database; this workspace has no such
    /// database, so only devices still tracked in the live queue are
    /// found. A watch whose device has already been freed from the queue
    /// produces no synthetic event — acceptable since the node is no
    /// longer in flux by the time that happens.
    fn lookup_device_by_devnode(&self, devnode: &str) -> Option<Device> {
        let sysname = devnode.rsplit('/').next()?;
        self.queue.find_by_sysname(sysname).map(|event| event.device.clone())
    }

    async fn drain_control_messages(&mut self) {
        loop {
            match self.control.receive().await {
                Ok(message) => self.handle_control_message(message).await,
                Err(err) => {
                    debug!(%err, "control connection closed or malformed message");
                    break;
                }
            }
        }
    }

    async fn handle_control_message(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::SetLogLevel(priority) => {
                crate::logging::set_level(&self.log_handle, priority);
                self.pool.kill_all();
            }
            ControlMessage::StopExecQueue => self.stop_exec_queue = true,
            ControlMessage::StartExecQueue => {
                self.stop_exec_queue = false;
                self.scan_and_dispatch().await;
            }
            ControlMessage::Reload => self.reload().await,
            ControlMessage::SetEnv { key, value } => {
                match &value {
                    Some(v) => self.properties.insert(key.clone(), v.clone()),
                    None => self.properties.remove(&key),
                };
                self.pool.kill_all();
            }
            ControlMessage::SetChildrenMax(n) => self.dispatcher.children_max = n as usize,
            ControlMessage::Ping => debug!("ping acknowledged at idle priority"),
            ControlMessage::Exit => self.exit_requested = true,
        }
    }

    async fn handle_worker_reply(&mut self, reply: WorkerReplyMsg) {
        match reply {
            WorkerReplyMsg::Published(_id, device) => {
                if let Err(err) = self.monitor.send(&device).await {
                    warn!(%err, "failed to publish processed device");
                }
            }
            WorkerReplyMsg::Completed(id) => {
                if let Some(seqnum) = self.pool.get(id).and_then(|w| w.event) {
                    self.timeouts.disarm(seqnum);
                    let _ = self.queue.free(self.owning_pid, seqnum);
                } else {
                    debug!(worker = ?id, "completion from unknown worker, ignoring");
                }
                if self.pool.mark_idle(id).is_err() {
                    debug!(worker = ?id, "mark-idle for unknown worker, ignoring");
                }
                self.scan_and_dispatch().await;
            }
            WorkerReplyMsg::Exited(id, success) => {
                if let Some(seqnum) = self.pool.reap(id) {
                    self.timeouts.disarm(seqnum);
                    match self.queue.free(self.owning_pid, seqnum) {
                        Ok(Some(event)) if !success => {
                            if let Err(err) = self.monitor.send(&event.device_kernel).await {
                                warn!(%err, "failed to re-publish pristine device after worker crash");
                            }
                        }
                        _ => {}
                    }
                }
                self.scan_and_dispatch().await;
            }
        }
    }

    async fn scan_and_dispatch(&mut self) {
        if self.stop_exec_queue {
            return;
        }

        let now = tokio::time::Instant::now();
        if now.duration_since(self.last_config_check) >= CONFIG_CHECK_INTERVAL {
            self.last_config_check = now;
            if !self.rules.is_current() {
                if let Err(err) = self.rules.load().await {
                    warn!(%err, "rule reload failed, keeping previously loaded rules");
                }
            }
        }

        for seqnum in self.queue.scan_runnable() {
            let Some(event) = self.queue.get(seqnum) else { continue };
            match self.dispatcher.dispatch(&mut self.pool, &mut self.spawner, event) {
                Ok(DispatchOutcome::Reused(worker) | DispatchOutcome::Spawned(worker)) => {
                    self.queue.attach(seqnum, worker);
                    self.timeouts.arm(seqnum, worker);
                }
                Ok(DispatchOutcome::AtCapacity) => break,
                Err(err) => warn!(%err, "dispatch failed"),
            }
        }

        for (seqnum, outcome) in self.timeouts.sweep() {
            match outcome {
                TimeoutOutcome::Warn => warn!(?seqnum, "event exceeded warning timeout"),
                TimeoutOutcome::Kill(worker) => {
                    warn!(?seqnum, ?worker, "event exceeded kill timeout, terminating worker");
                    let _ = self.pool.kill(worker, true);
                }
                TimeoutOutcome::Ok => {}
            }
        }
    }

    /// Runs after every batch (spec.md §4.8). Returns `Some(code)` when
    /// the loop should exit.
    fn post_loop_hook(&mut self, idle_kill_at: &mut Option<tokio::time::Instant>) -> Option<i32> {
        if !self.queue.is_empty() {
            *idle_kill_at = None;
            return None;
        }
        if !self.pool.is_empty() {
            if idle_kill_at.is_none() {
                *idle_kill_at = Some(tokio::time::Instant::now() + IDLE_KILL_DELAY);
            }
            return None;
        }
        *idle_kill_at = None;
        if self.exit_requested {
            crate::notify::stopping();
            return Some(0);
        }
        if let Some(cgroup) = &self.cgroup {
            cgroup.kill_lingering(self.owning_pid);
        }
        None
    }
}

/// Build a spawned worker's environment from the daemon's config and its
/// current property-override snapshot.
pub fn worker_env(config: &crate::config::Config, properties: &HashMap<String, String>) -> WorkerEnv {
    WorkerEnv {
        exec_delay_secs: config.exec_delay.as_secs(),
        event_timeout_secs: config.event_timeout.as_secs(),
        properties: properties.clone(),
        debug: config.debug,
    }
}
