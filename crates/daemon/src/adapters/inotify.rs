// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The real inotify transport, backing `udevd-ports::Inotify`.
//!
//! Grounded in `on_inotify()` (`original_source/src/udev/udevd.c:1157ff`):
//! one inotify instance watches every device node the rules asked to be
//! notified about. The `Inotify` port trait identifies watches by a
//! caller-visible `i32`; this adapter keeps its own sequential ids and
//! maps them to `nix`'s opaque `WatchDescriptor`, so the port contract
//! doesn't leak the `nix` type.

use std::collections::HashMap;
use std::os::fd::AsRawFd;

use async_trait::async_trait;
use nix::sys::inotify::{AddWatchFlags, InitFlags, Inotify as NixInotify, WatchDescriptor};
use tokio::io::unix::AsyncFd;

use udevd_ports::{Inotify, WatchError, WatchEvent};

pub struct RealInotify {
    fd: AsyncFd<NixInotify>,
    next_id: i32,
    by_id: HashMap<i32, (WatchDescriptor, String)>,
    by_wd: HashMap<WatchDescriptor, i32>,
}

impl RealInotify {
    pub fn new() -> Result<Self, WatchError> {
        let inotify = NixInotify::init(InitFlags::IN_NONBLOCK | InitFlags::IN_CLOEXEC)
            .map_err(|e| WatchError::Io(e.into()))?;
        Ok(Self {
            fd: AsyncFd::new(inotify).map_err(WatchError::Io)?,
            next_id: 1,
            by_id: HashMap::new(),
            by_wd: HashMap::new(),
        })
    }
}

#[async_trait]
impl Inotify for RealInotify {
    async fn watch(&mut self, devnode: &str) -> Result<i32, WatchError> {
        let wd = self
            .fd
            .get_ref()
            .add_watch(devnode, AddWatchFlags::IN_CLOSE_WRITE)
            .map_err(|e| WatchError::Io(e.into()))?;
        let id = self.next_id;
        self.next_id += 1;
        self.by_id.insert(id, (wd, devnode.to_string()));
        self.by_wd.insert(wd, id);
        Ok(id)
    }

    async fn read_events(&mut self) -> Result<Vec<WatchEvent>, WatchError> {
        loop {
            let mut guard = self.fd.readable().await.map_err(WatchError::Io)?;
            let read = guard.try_io(|fd| fd.get_ref().read_events().map_err(std::io::Error::from));
            let raw_events = match read {
                Ok(result) => result.map_err(WatchError::Io)?,
                Err(_would_block) => continue,
            };
            let mut out = Vec::with_capacity(raw_events.len());
            for event in raw_events {
                let Some(&id) = self.by_wd.get(&event.wd) else { continue };
                if event.mask.contains(AddWatchFlags::IN_IGNORED) {
                    self.by_wd.remove(&event.wd);
                    self.by_id.remove(&id);
                    out.push(WatchEvent::Ignored(id));
                } else if event.mask.contains(AddWatchFlags::IN_CLOSE_WRITE) {
                    out.push(WatchEvent::CloseWrite(id));
                }
            }
            return Ok(out);
        }
    }

    fn resolve(&self, wd: i32) -> Option<&str> {
        self.by_id.get(&wd).map(|(_, path)| path.as_str())
    }
}

impl AsRawFd for RealInotify {
    fn as_raw_fd(&self) -> std::os::fd::RawFd {
        self.fd.get_ref().as_raw_fd()
    }
}
