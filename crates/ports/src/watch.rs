// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The inotify contract for device-node close-write watches.
//!
//! Grounded in `on_inotify()` (`original_source/src/udev/udevd.c:1157ff`):
//! one inotify instance watches every device node the rules asked to be
//! notified about; `IN_CLOSE_WRITE` on a watched node synthesizes a
//! change event, `IN_IGNORED` means the watch was dropped (e.g. the node
//! was removed) and must be forgotten.

use async_trait::async_trait;

use crate::error::WatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    /// A watched node was closed after being opened for writing.
    CloseWrite(i32),
    /// The kernel dropped a watch (node removed, filesystem unmounted).
    Ignored(i32),
}

#[async_trait]
pub trait Inotify: Send + Sync + 'static {
    /// Add (or refresh) a watch on `devnode`, returning its descriptor.
    async fn watch(&mut self, devnode: &str) -> Result<i32, WatchError>;

    /// Block until at least one inotify record is available, then drain
    /// and return everything currently pending.
    async fn read_events(&mut self) -> Result<Vec<WatchEvent>, WatchError>;

    /// Resolve a watch descriptor back to the devpath it was registered
    /// for, so a `CloseWrite`/`Ignored` record can be turned into an
    /// action. `None` if the descriptor is unknown (already forgotten).
    fn resolve(&self, wd: i32) -> Option<&str>;
}

/// In-memory inotify stand-in: watches are just a map from a
/// caller-assigned descriptor to the devpath string.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeInotify {
    next_wd: i32,
    watches: std::collections::HashMap<i32, String>,
    pending: std::collections::VecDeque<WatchEvent>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeInotify {
    pub fn new() -> Self {
        Self { next_wd: 1, watches: std::collections::HashMap::new(), pending: std::collections::VecDeque::new() }
    }

    /// Test hook: enqueue a record as if the kernel had delivered it.
    pub fn push_event(&mut self, event: WatchEvent) {
        self.pending.push_back(event);
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for FakeInotify {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl Inotify for FakeInotify {
    async fn watch(&mut self, devnode: &str) -> Result<i32, WatchError> {
        let wd = self.next_wd;
        self.next_wd += 1;
        self.watches.insert(wd, devnode.to_string());
        Ok(wd)
    }

    async fn read_events(&mut self) -> Result<Vec<WatchEvent>, WatchError> {
        let drained: Vec<WatchEvent> = self.pending.drain(..).collect();
        for event in &drained {
            if let WatchEvent::Ignored(wd) = event {
                self.watches.remove(wd);
            }
        }
        Ok(drained)
    }

    fn resolve(&self, wd: i32) -> Option<&str> {
        self.watches.get(&wd).map(String::as_str)
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
