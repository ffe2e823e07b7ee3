// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The real control-channel transport.
//!
//! Grounded in `udev_ctrl_new()` / `udev_ctrl_get_fd()` / `ctrl_conn` in
//! the original supervisor (`original_source/src/udev/udevd.c`), which
//! listens on an `AF_LOCAL`/`SOCK_SEQPACKET` socket. This adapter binds a
//! `SOCK_STREAM` Unix listener instead (see `fds.rs` and `DESIGN.md` for
//! why the descriptor isn't adopted raw): the `ControlChannel` contract
//! in `udevd-ports` only fixes accept/receive/decode semantics, not wire
//! framing, so the transport substitution doesn't change anything the
//! supervisor loop observes.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::unix::OwnedReadHalf;
use tokio::net::UnixListener;
use tokio::sync::Mutex;

use udevd_ports::{decode, ControlChannel, ControlError, ControlMessage};

pub struct UnixControlChannel {
    listener: UnixListener,
    current: Mutex<Option<BufReader<OwnedReadHalf>>>,
}

impl UnixControlChannel {
    /// Bind the control socket at `path`, removing a stale socket file
    /// left behind by a prior unclean exit.
    pub fn bind(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        let listener = UnixListener::bind(path)?;
        Ok(Self { listener, current: Mutex::new(None) })
    }

    pub fn socket_path(&self) -> std::io::Result<PathBuf> {
        self.listener.local_addr()?.as_pathname().map(Path::to_path_buf).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "control socket has no filesystem path")
        })
    }
}

#[async_trait]
impl ControlChannel for UnixControlChannel {
    async fn accept(&self) -> Result<(), ControlError> {
        let (stream, _addr) = self.listener.accept().await?;
        let (read, _write) = stream.into_split();
        *self.current.lock().await = Some(BufReader::new(read));
        Ok(())
    }

    async fn receive(&self) -> Result<ControlMessage, ControlError> {
        let mut guard = self.current.lock().await;
        let Some(reader) = guard.as_mut() else {
            return Err(ControlError::Decode("no accepted connection".to_string()));
        };
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            *guard = None;
            return Err(ControlError::Decode("connection closed".to_string()));
        }
        decode(&line)
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
