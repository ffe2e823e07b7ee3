// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The out-of-band control channel contract.
//!
//! Grounded in `on_ctrl_msg()` and the `udev_ctrl_get_*` accessors
//! (`original_source/src/udev/udevd.c:920-1035`). Every message here
//! corresponds to one accessor checked there; the codec's job is only to
//! accept a connection, read one message, and decode it to this enum —
//! applying the message is the supervisor loop's job, not the channel's.

use async_trait::async_trait;

use crate::error::ControlError;

/// One decoded request from a control-channel client (e.g. `udevadm
/// control`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    SetLogLevel(u8),
    StopExecQueue,
    StartExecQueue,
    Reload,
    /// `value: None` unsets the property, mirroring `SET_ENV key=` with an
    /// empty right-hand side in the original.
    SetEnv { key: String, value: Option<String> },
    SetChildrenMax(u32),
    Ping,
    Exit,
}

#[async_trait]
pub trait ControlChannel: Send + Sync + 'static {
    /// Block until a client connects, then return a session handle the
    /// loop polls for messages. `exit` connections are held open by the
    /// caller until shutdown completes, per the original's blocking
    /// `ctrl_conn_blocking` reference.
    async fn accept(&self) -> Result<(), ControlError>;

    /// Read and decode the next message from the accepted connection.
    async fn receive(&self) -> Result<ControlMessage, ControlError>;
}

/// Decode one `KEY[=VALUE]` control-channel line. `SET_ENV` is the only
/// message that carries a `key=value` payload; everything else is a bare
/// keyword or keyword=single-value pair.
pub fn decode(line: &str) -> Result<ControlMessage, ControlError> {
    let line = line.trim();
    let (keyword, rest) = match line.split_once('=') {
        Some((k, v)) => (k, Some(v)),
        None => (line, None),
    };
    match (keyword, rest) {
        ("SET_LOG_LEVEL", Some(v)) => {
            v.parse().map(ControlMessage::SetLogLevel).map_err(|_| ControlError::Decode(line.to_string()))
        }
        ("STOP_EXEC_QUEUE", None) => Ok(ControlMessage::StopExecQueue),
        ("START_EXEC_QUEUE", None) => Ok(ControlMessage::StartExecQueue),
        ("RELOAD", None) => Ok(ControlMessage::Reload),
        ("SET_ENV", Some(kv)) => match kv.split_once('=') {
            Some((key, "")) => Ok(ControlMessage::SetEnv { key: key.to_string(), value: None }),
            Some((key, value)) => {
                Ok(ControlMessage::SetEnv { key: key.to_string(), value: Some(value.to_string()) })
            }
            None => Err(ControlError::Decode(line.to_string())),
        },
        ("SET_CHILDREN_MAX", Some(v)) => {
            v.parse().map(ControlMessage::SetChildrenMax).map_err(|_| ControlError::Decode(line.to_string()))
        }
        ("PING", None) => Ok(ControlMessage::Ping),
        ("EXIT", None) => Ok(ControlMessage::Exit),
        _ => Err(ControlError::Decode(line.to_string())),
    }
}

/// Queue-backed stand-in for exercising the control-message handling
/// logic without a real control socket.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeControlChannel {
    inbox: tokio::sync::Mutex<tokio::sync::mpsc::Receiver<ControlMessage>>,
    pub sender: tokio::sync::mpsc::Sender<ControlMessage>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeControlChannel {
    pub fn new() -> (Self, tokio::sync::mpsc::Sender<ControlMessage>) {
        let (tx, rx) = tokio::sync::mpsc::channel(64);
        (Self { inbox: tokio::sync::Mutex::new(rx), sender: tx.clone() }, tx)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl ControlChannel for FakeControlChannel {
    async fn accept(&self) -> Result<(), ControlError> {
        Ok(())
    }

    async fn receive(&self) -> Result<ControlMessage, ControlError> {
        self.inbox.lock().await.recv().await.ok_or_else(|| ControlError::Decode("channel closed".into()))
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
