use super::*;
use crate::device::Action;

fn device(seqnum: u64, devpath: &str) -> Device {
    Device {
        seqnum: SeqNum(seqnum),
        devpath: devpath.to_string(),
        devpath_old: None,
        devnum: DevNum::NONE,
        ifindex: None,
        subsystem: "block".to_string(),
        devtype: None,
        action: Action::Add,
        sysname: "sda".to_string(),
    }
}

#[test]
fn new_event_caches_identity_keys_from_device() {
    let e = Event::new(device(10, "/devices/pci/sda"));
    assert_eq!(e.seqnum, SeqNum(10));
    assert_eq!(e.devpath, "/devices/pci/sda");
    assert_eq!(e.state, EventState::Queued);
    assert!(e.delaying_seqnum.is_none());
    assert!(e.worker.is_none());
}

#[test]
fn new_event_retains_pristine_kernel_clone() {
    let mut e = Event::new(device(1, "/devices/pci/sda"));
    e.device.devpath = "/devices/pci/sda-renamed".to_string();
    assert_eq!(e.device_kernel.devpath, "/devices/pci/sda");
    assert_eq!(e.device.devpath, "/devices/pci/sda-renamed");
}

#[test]
fn attach_transitions_to_running() {
    let mut e = Event::new(device(1, "/devices/pci/sda"));
    e.attach(WorkerId(4242));
    assert!(e.is_running());
    assert_eq!(e.worker, Some(WorkerId(4242)));
}

#[test]
fn delaying_seqnum_never_decreases() {
    let mut e = Event::new(device(10, "/devices/pci/sda"));
    e.set_delaying_seqnum(SeqNum(3));
    assert_eq!(e.delaying_seqnum, SeqNum(3));
    e.set_delaying_seqnum(SeqNum(1));
    assert_eq!(e.delaying_seqnum, SeqNum(3), "must not decrease");
    e.set_delaying_seqnum(SeqNum(7));
    assert_eq!(e.delaying_seqnum, SeqNum(7));
}
