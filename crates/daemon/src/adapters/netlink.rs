// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The real `NETLINK_KOBJECT_UEVENT` transport.
//!
//! Grounded in `udev_monitor_new_from_netlink_fd()` and the worker-private
//! unicast monitor opened in `worker_new()`
//! (`original_source/src/udev/udevd.c`). Both the supervisor's kernel-facing
//! monitor and each worker's private monitor are one `AF_NETLINK` socket
//! with a different bind: the kernel monitor joins the kobject-uevent
//! multicast group, a worker monitor binds to its own pid and is only ever
//! talked to directly by the supervisor.

use std::collections::HashMap;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};

use async_trait::async_trait;
use nix::sys::socket::{
    self, AddressFamily, MsgFlags, NetlinkAddr, SockFlag, SockProtocol, SockType,
};
use tokio::io::unix::AsyncFd;
use udevd_core::{Action, DevNum, Device, SeqNum};
use udevd_ports::{MonitorError, NetlinkMonitor};

/// The well-known kernel multicast group carrying device uevents.
const UEVENT_GROUP: u32 = 1;

/// A bound `AF_NETLINK`/`NETLINK_KOBJECT_UEVENT` socket, wrapped for async
/// readiness polling. One instance serves either role described above,
/// depending on how it's constructed.
pub struct NetlinkMonitorHandle {
    fd: AsyncFd<OwnedFd>,
    peer: Option<NetlinkAddr>,
}

impl NetlinkMonitorHandle {
    /// Open the supervisor's kernel-facing monitor, subscribed to the
    /// uevent multicast group.
    pub fn kernel() -> Result<Self, MonitorError> {
        let fd = bind(NetlinkAddr::new(0, UEVENT_GROUP))?;
        Ok(Self { fd: AsyncFd::new(fd)?, peer: None })
    }

    /// Open a worker's private monitor, bound to its own pid with no
    /// multicast membership, and pointed at the supervisor as its peer.
    pub fn worker_private(pid: u32, supervisor: NetlinkAddr) -> Result<Self, MonitorError> {
        let fd = bind(NetlinkAddr::new(pid, 0))?;
        Ok(Self { fd: AsyncFd::new(fd)?, peer: Some(supervisor) })
    }

    /// This socket's own address, for handing to a spawned worker as its
    /// send target.
    pub fn local_addr(&self) -> Result<NetlinkAddr, MonitorError> {
        socket::getsockname(self.fd.get_ref().as_raw_fd()).map_err(|e| MonitorError::Io(e.into()))
    }
}

fn bind(addr: NetlinkAddr) -> Result<OwnedFd, MonitorError> {
    let fd = socket::socket(
        AddressFamily::Netlink,
        SockType::Raw,
        SockFlag::SOCK_CLOEXEC | SockFlag::SOCK_NONBLOCK,
        SockProtocol::NetlinkKObjectUEvent,
    )
    .map_err(|e| MonitorError::Io(e.into()))?;
    socket::bind(fd.as_raw_fd(), &addr).map_err(|e| MonitorError::Io(e.into()))?;
    Ok(fd)
}

#[async_trait]
impl NetlinkMonitor for NetlinkMonitorHandle {
    fn fd(&self) -> RawFd {
        self.fd.get_ref().as_raw_fd()
    }

    async fn send(&self, device: &Device) -> Result<(), MonitorError> {
        let peer = self.peer.ok_or(MonitorError::NoPeer)?;
        let payload = encode(device);
        loop {
            let mut guard = self.fd.writable().await?;
            match guard.try_io(|fd| {
                socket::sendto(fd.get_ref().as_raw_fd(), &payload, &peer, MsgFlags::empty())
                    .map_err(std::io::Error::from)
            }) {
                Ok(result) => {
                    result?;
                    return Ok(());
                }
                Err(_would_block) => continue,
            }
        }
    }

    async fn receive(&self) -> Result<Device, MonitorError> {
        let mut buf = [0u8; 8192];
        loop {
            let mut guard = self.fd.readable().await?;
            let read = guard.try_io(|fd| {
                socket::recv(fd.get_ref().as_raw_fd(), &mut buf, MsgFlags::empty())
                    .map_err(std::io::Error::from)
            });
            let n = match read {
                Ok(result) => result?,
                Err(_would_block) => continue,
            };
            if let Some(device) = decode(&buf[..n]) {
                return Ok(device);
            }
            // Not a well-formed uevent (e.g. a kernel broadcast this
            // process doesn't understand yet); wait for the next one.
        }
    }
}

/// Encode a device as `ACTION@DEVPATH\0KEY=VALUE\0...`, the wire format
/// `libudev` and the kernel both speak on this socket.
fn encode(device: &Device) -> Vec<u8> {
    let mut out = format!("{}@{}", device.action, device.devpath).into_bytes();
    out.push(0);
    let mut push_kv = |key: &str, value: String| {
        out.extend_from_slice(key.as_bytes());
        out.push(b'=');
        out.extend_from_slice(value.as_bytes());
        out.push(0);
    };
    push_kv("ACTION", device.action.to_string());
    push_kv("DEVPATH", device.devpath.clone());
    push_kv("SUBSYSTEM", device.subsystem.clone());
    push_kv("SEQNUM", device.seqnum.0.to_string());
    push_kv("SYSNAME", device.sysname.clone());
    if let Some(devpath_old) = &device.devpath_old {
        push_kv("DEVPATH_OLD", devpath_old.clone());
    }
    if let Some(devtype) = &device.devtype {
        push_kv("DEVTYPE", devtype.clone());
    }
    if !device.devnum.is_none() {
        push_kv("MAJOR", device.devnum.major.to_string());
        push_kv("MINOR", device.devnum.minor.to_string());
    }
    if let Some(ifindex) = device.ifindex {
        push_kv("IFINDEX", ifindex.to_string());
    }
    out
}

/// Parse the same format back into a [`Device`]. `None` for anything that
/// doesn't look like a uevent (missing header, or missing a required key).
fn decode(data: &[u8]) -> Option<Device> {
    let first_null = data.iter().position(|&b| b == 0)?;
    let header = std::str::from_utf8(&data[..first_null]).ok()?;
    let at_pos = header.find('@')?;
    let action = Action::parse(&header[..at_pos])?;
    let devpath = header[at_pos + 1..].to_string();

    let mut env = HashMap::new();
    let mut offset = first_null + 1;
    while offset < data.len() {
        let end =
            data[offset..].iter().position(|&b| b == 0).map(|p| offset + p).unwrap_or(data.len());
        if end > offset {
            if let Ok(kv) = std::str::from_utf8(&data[offset..end]) {
                if let Some((key, value)) = kv.split_once('=') {
                    env.insert(key.to_string(), value.to_string());
                }
            }
        }
        offset = end + 1;
    }

    let subsystem = env.get("SUBSYSTEM").cloned().unwrap_or_default();
    let seqnum = env.get("SEQNUM").and_then(|s| s.parse().ok()).map(SeqNum).unwrap_or(SeqNum(0));
    let sysname = env.get("SYSNAME").cloned().unwrap_or_else(|| {
        devpath.rsplit('/').next().unwrap_or_default().to_string()
    });
    let devnum = match (env.get("MAJOR"), env.get("MINOR")) {
        (Some(major), Some(minor)) => DevNum {
            major: major.parse().unwrap_or(0),
            minor: minor.parse().unwrap_or(0),
        },
        _ => DevNum::NONE,
    };

    Some(Device {
        seqnum,
        devpath,
        devpath_old: env.get("DEVPATH_OLD").cloned(),
        devnum,
        ifindex: env.get("IFINDEX").and_then(|s| s.parse().ok()),
        subsystem,
        devtype: env.get("DEVTYPE").cloned(),
        action,
        sysname,
    })
}

#[cfg(test)]
#[path = "netlink_tests.rs"]
mod tests;
