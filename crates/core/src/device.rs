// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The device handle: the kernel's view of one uevent.

use crate::seqnum::SeqNum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Device node major/minor, as reported by the kernel. `major == 0` means
/// "no device node" — major 0 is reserved and never assigned to a real
/// device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DevNum {
    pub major: u32,
    pub minor: u32,
}

impl DevNum {
    pub const NONE: DevNum = DevNum { major: 0, minor: 0 };

    pub fn is_none(self) -> bool {
        self.major == 0
    }
}

impl Default for DevNum {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for DevNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

/// Kernel uevent action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Add,
    Remove,
    Change,
    Move,
    Online,
    Offline,
    Bind,
    Unbind,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Remove => "remove",
            Action::Change => "change",
            Action::Move => "move",
            Action::Online => "online",
            Action::Offline => "offline",
            Action::Bind => "bind",
            Action::Unbind => "unbind",
        }
    }

    pub fn parse(s: &str) -> Option<Action> {
        Some(match s {
            "add" => Action::Add,
            "remove" => Action::Remove,
            "change" => Action::Change,
            "move" => Action::Move,
            "online" => Action::Online,
            "offline" => Action::Offline,
            "bind" => Action::Bind,
            "unbind" => Action::Unbind,
            _ => return None,
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One kernel device notification.
///
/// Carries identity keys only — no parsed rule state, no sysfs handles.
/// Opaque beyond what the queue's ordering algorithm and the worker
/// runtime need to read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub seqnum: SeqNum,
    pub devpath: String,
    pub devpath_old: Option<String>,
    pub devnum: DevNum,
    pub ifindex: Option<u32>,
    pub subsystem: String,
    pub devtype: Option<String>,
    pub action: Action,
    pub sysname: String,
}

impl Device {
    /// `true` when this device identifies a block device node
    /// (`devnum` present and `subsystem == "block"`).
    pub fn is_block(&self) -> bool {
        !self.devnum.is_none() && self.subsystem == "block"
    }

    /// `true` when this device identifies a live network interface.
    pub fn has_ifindex(&self) -> bool {
        self.ifindex.is_some_and(|i| i > 0)
    }
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
