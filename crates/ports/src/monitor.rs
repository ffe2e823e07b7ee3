// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The kernel uevent transport contract.
//!
//! Grounded in `udev_monitor_new_from_netlink_fd()` / `_get_fd()` /
//! `_send_device()` / `_receive_device()`, and the worker-side unicast
//! monitor set up in `worker_new()` (`original_source/src/udev/udevd.c`).
//! Two roles share this trait: the manager's monitor (kernel ⇄ supervisor)
//! and each worker's private monitor (supervisor ⇄ one worker).

use async_trait::async_trait;
use std::os::fd::RawFd;
use udevd_core::Device;

use crate::error::MonitorError;

#[async_trait]
pub trait NetlinkMonitor: Send + Sync + 'static {
    /// The raw file descriptor to register with the event loop's poller.
    fn fd(&self) -> RawFd;

    /// Unicast `device` to this monitor's configured peer (e.g. the
    /// supervisor sending a fresh event to one worker's private socket).
    async fn send(&self, device: &Device) -> Result<(), MonitorError>;

    /// Receive the next device notification, blocking until one arrives.
    async fn receive(&self) -> Result<Device, MonitorError>;
}

/// In-memory monitor backed by an mpsc channel, for exercising dispatch
/// and supervisor-loop logic without a real netlink socket.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeMonitor {
    inbox: tokio::sync::Mutex<tokio::sync::mpsc::Receiver<Device>>,
    pub outbox: tokio::sync::mpsc::Sender<Device>,
    pub accepts: std::sync::atomic::AtomicBool,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeMonitor {
    pub fn new() -> (Self, tokio::sync::mpsc::Sender<Device>, tokio::sync::mpsc::Receiver<Device>) {
        let (inbox_tx, inbox_rx) = tokio::sync::mpsc::channel(64);
        let (outbox_tx, outbox_rx) = tokio::sync::mpsc::channel(64);
        let monitor = Self {
            inbox: tokio::sync::Mutex::new(inbox_rx),
            outbox: outbox_tx,
            accepts: std::sync::atomic::AtomicBool::new(true),
        };
        (monitor, inbox_tx, outbox_rx)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl NetlinkMonitor for FakeMonitor {
    fn fd(&self) -> RawFd {
        -1
    }

    async fn send(&self, device: &Device) -> Result<(), MonitorError> {
        if !self.accepts.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(MonitorError::NoPeer);
        }
        self.outbox.send(device.clone()).await.map_err(|_| MonitorError::NoPeer)
    }

    async fn receive(&self) -> Result<Device, MonitorError> {
        self.inbox.lock().await.recv().await.ok_or(MonitorError::NoPeer)
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
