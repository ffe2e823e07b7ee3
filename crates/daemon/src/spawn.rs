// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real worker process spawning.
//!
//! Grounded in `worker_new()` (`original_source/src/udev/udevd.c`): fork a
//! child, give it a private channel back to the manager, track it as
//! `Running`. The original forks directly and the child falls straight
//! into the worker runtime with inherited fds; this workspace forbids
//! `unsafe` (see `fds.rs`), so raw `fork()` + fd inheritance isn't
//! available. Instead each worker is `tokio::process::Command::spawn`ed
//! re-executing this same binary with the hidden `--udevd-worker` flag
//! (`main.rs`), wired to its private channel over piped stdin/stdout:
//! the manager writes one JSON `Device` per line to stdin and reads
//! either a processed `Device` (publish) or the literal line `OK`
//! (completion) back from stdout. This preserves the spec's "private
//! monitor channel" and "completion signal" semantics; only the
//! transport and the sender-identification mechanism change (§4.5 step
//! 9's `SO_PASSCRED` lookup is unnecessary here, since each reader task
//! already knows which child it's reading from).

use std::process::Stdio;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, warn};

use udevd_core::{Device, WorkerId};
use udevd_pool::{PoolError, WorkerChannel, WorkerSpawner};

/// What a worker reports back to the manager's single reply channel, or
/// what the process-exit watcher reports when it's reaped.
#[derive(Debug)]
pub enum WorkerReplyMsg {
    /// The worker finished applying rules to its attached event and
    /// wants the processed device published to external subscribers.
    Published(WorkerId, Box<Device>),
    /// The worker signaled completion (§4.5 step 9): free its event.
    Completed(WorkerId),
    /// The child process exited; `success` mirrors a zero exit status.
    Exited(WorkerId, bool),
}

/// A worker's side of the manager's channel: an mpsc sender feeding the
/// async task that owns the child's stdin, plus the pid for signalling.
pub struct ChildHandle {
    pid: u32,
    tx: UnboundedSender<Device>,
}

impl WorkerChannel for ChildHandle {
    fn send(&self, device: &Device) -> bool {
        self.tx.send(device.clone()).is_ok()
    }

    fn kill(&self, force: bool) {
        let signal = if force { Signal::SIGKILL } else { Signal::SIGTERM };
        if let Err(err) = signal::kill(Pid::from_raw(self.pid as i32), signal) {
            warn!(pid = self.pid, %err, "failed to signal worker");
        }
    }
}

/// Environment a spawned worker inherits: everything it needs to run the
/// worker runtime (`worker_runtime.rs`) without talking back to the
/// manager for configuration.
#[derive(Debug, Clone)]
pub struct WorkerEnv {
    pub exec_delay_secs: u64,
    pub event_timeout_secs: u64,
    pub properties: std::collections::HashMap<String, String>,
    pub debug: bool,
}

pub struct ProcessSpawner {
    current_exe: std::path::PathBuf,
    env: WorkerEnv,
    reply_tx: UnboundedSender<WorkerReplyMsg>,
}

impl ProcessSpawner {
    pub fn new(env: WorkerEnv, reply_tx: UnboundedSender<WorkerReplyMsg>) -> std::io::Result<Self> {
        Ok(Self { current_exe: std::env::current_exe()?, env, reply_tx })
    }

    pub fn set_env(&mut self, env: WorkerEnv) {
        self.env = env;
    }
}

impl WorkerSpawner<ChildHandle> for ProcessSpawner {
    fn spawn(&mut self, _device: &Device) -> Result<(WorkerId, ChildHandle), PoolError> {
        let mut command = Command::new(&self.current_exe);
        command
            .arg("--udevd-worker")
            .env("UDEVD_EXEC_DELAY_SECS", self.env.exec_delay_secs.to_string())
            .env("UDEVD_EVENT_TIMEOUT_SECS", self.env.event_timeout_secs.to_string())
            .env("UDEVD_DEBUG", if self.env.debug { "1" } else { "0" })
            .env(
                "UDEVD_PROPERTIES",
                serde_json::to_string(&self.env.properties).unwrap_or_default(),
            )
            .env_remove("NOTIFY_SOCKET")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(false);

        let mut child = command.spawn().map_err(PoolError::Spawn)?;
        let pid = child.id().ok_or_else(|| {
            PoolError::Spawn(std::io::Error::other("spawned worker has no pid"))
        })?;

        let stdin = child.stdin.take().expect("piped stdin");
        let stdout = child.stdout.take().expect("piped stdout");

        let (tx, mut rx) = mpsc::unbounded_channel::<Device>();
        tokio::spawn(async move {
            let mut stdin = stdin;
            while let Some(device) = rx.recv().await {
                let Ok(mut line) = serde_json::to_string(&device) else { continue };
                line.push('\n');
                if stdin.write_all(line.as_bytes()).await.is_err() {
                    break;
                }
                if stdin.flush().await.is_err() {
                    break;
                }
            }
        });

        let reply_tx = self.reply_tx.clone();
        let worker_id = WorkerId(pid);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line == "OK" {
                            let _ = reply_tx.send(WorkerReplyMsg::Completed(worker_id));
                        } else if let Ok(device) = serde_json::from_str::<Device>(&line) {
                            let _ = reply_tx.send(WorkerReplyMsg::Published(worker_id, Box::new(device)));
                        } else {
                            debug!(%line, "ignoring unrecognized line from worker stdout");
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        warn!(%err, "error reading worker stdout");
                        break;
                    }
                }
            }
        });

        let reply_tx = self.reply_tx.clone();
        tokio::spawn(async move {
            let status = child.wait().await;
            let success = matches!(status, Ok(s) if s.success());
            let _ = reply_tx.send(WorkerReplyMsg::Exited(worker_id, success));
        });

        Ok((worker_id, ChildHandle { pid, tx }))
    }
}
