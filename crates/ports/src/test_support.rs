// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use udevd_core::{Action, DevNum, Device, SeqNum};

pub fn sample_device() -> Device {
    Device {
        seqnum: SeqNum(1),
        devpath: "/devices/pci/sda".to_string(),
        devpath_old: None,
        devnum: DevNum::NONE,
        ifindex: None,
        subsystem: "block".to_string(),
        devtype: None,
        action: Action::Add,
        sysname: "sda".to_string(),
    }
}
