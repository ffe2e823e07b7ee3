use super::*;
use udevd_core::{Action, DevNum};

fn dev(seqnum: u64, devpath: &str) -> Device {
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

fn queue() -> EventQueue {
    let dir = tempfile::tempdir().unwrap();
    // Leak the tempdir so the marker path stays valid for the test's
    // lifetime; individual tests don't assert on filesystem cleanup.
    let path = dir.into_path().join("queue");
    EventQueue::new(std::process::id(), path)
}

#[test]
fn insert_from_wrong_pid_is_rejected() {
    let mut q = queue();
    let err = q.insert(std::process::id() + 1, dev(1, "/devices/pci/sda")).unwrap_err();
    assert!(matches!(err, QueueError::NotOwner { .. }));
    assert!(q.is_empty());
}

#[test]
fn empty_to_nonempty_creates_marker_nonempty_to_empty_removes_it() {
    let pid = std::process::id();
    let mut q = queue();
    assert!(!q.marker_path().exists());

    q.insert(pid, dev(1, "/devices/pci/sda")).unwrap();
    assert!(q.marker_path().exists());

    q.free(pid, SeqNum(1)).unwrap();
    assert!(!q.marker_path().exists());
}

#[test]
fn scenario_same_block_device_serializes_in_seqnum_order() {
    // Same block device, two sequential events: must serialize in seqnum order.
    let pid = std::process::id();
    let mut q = queue();
    let mut d10 = dev(10, "/devices/pci/sda");
    d10.devnum = DevNum { major: 8, minor: 0 };
    let mut d11 = dev(11, "/devices/pci/sda");
    d11.devnum = DevNum { major: 8, minor: 0 };
    q.insert(pid, d10).unwrap();
    q.insert(pid, d11).unwrap();

    let runnable = q.scan_runnable();
    assert_eq!(runnable, vec![SeqNum(10)]);
    assert!(q.is_busy(SeqNum(11)));
    assert_eq!(q.get(SeqNum(11)).unwrap().delaying_seqnum, SeqNum(10));

    q.attach(SeqNum(10), WorkerId(1));
    q.free(pid, SeqNum(10)).unwrap();

    let runnable = q.scan_runnable();
    assert_eq!(runnable, vec![SeqNum(11)]);
}

#[test]
fn scenario_child_ifindex_blocks_on_parent_interface() {
    // A child interface event must wait for its parent interface's event.
    let pid = std::process::id();
    let mut q = queue();
    let mut d20 = dev(20, "/devices/pci/eth0");
    d20.ifindex = Some(3);
    let d21 = dev(21, "/devices/pci/eth0/queues/rx-0");
    q.insert(pid, d20).unwrap();
    q.insert(pid, d21).unwrap();

    let runnable = q.scan_runnable();
    assert_eq!(runnable, vec![SeqNum(20)]);
    assert!(q.is_busy(SeqNum(21)), "child devpath blocks on parent");
}

#[test]
fn scenario_rename_blocks_on_old_devpath_user() {
    // A rename event must wait for whatever last used the old devpath.
    let pid = std::process::id();
    let mut q = queue();
    let d30 = dev(30, "/devices/x");
    let mut d31 = dev(31, "/devices/y");
    d31.devpath_old = Some("/devices/x".to_string());
    q.insert(pid, d30).unwrap();
    q.insert(pid, d31).unwrap();

    assert!(q.is_busy(SeqNum(31)));
    assert_eq!(q.get(SeqNum(31)).unwrap().delaying_seqnum, SeqNum(30));

    q.free(pid, SeqNum(30)).unwrap();
    assert!(!q.is_busy(SeqNum(31)));
}

#[test]
fn unrelated_devpaths_never_block_each_other() {
    let pid = std::process::id();
    let mut q = queue();
    q.insert(pid, dev(1, "/devices/pci/sda")).unwrap();
    q.insert(pid, dev(2, "/devices/pci/sdb")).unwrap();
    q.insert(pid, dev(3, "/devices/pci/sdc")).unwrap();

    let runnable = q.scan_runnable();
    assert_eq!(runnable, vec![SeqNum(1), SeqNum(2), SeqNum(3)]);
}

#[test]
fn identical_devpath_with_device_identity_defers_instead_of_blocking() {
    // Case 7 "equal length, devnum/ifindex set": continue rather than block,
    // since identical devpaths with a set device identity may just be a
    // rename in flight rather than a genuine collision.
    let pid = std::process::id();
    let mut q = queue();
    let mut d1 = dev(1, "/devices/pci/sda");
    d1.devnum = DevNum { major: 8, minor: 0 };
    let mut d2 = dev(2, "/devices/pci/sda");
    d2.devnum = DevNum { major: 8, minor: 0 };
    q.insert(pid, d1).unwrap();
    q.insert(pid, d2).unwrap();

    assert!(!q.is_busy(SeqNum(2)), "identity events with equal devpath defer rather than block");
}

#[test]
fn cleanup_queued_only_preserves_running_events() {
    let pid = std::process::id();
    let mut q = queue();
    q.insert(pid, dev(1, "/devices/pci/sda")).unwrap();
    q.insert(pid, dev(2, "/devices/pci/sdb")).unwrap();
    q.attach(SeqNum(1), WorkerId(42));

    let removed = q.cleanup(pid, CleanupFilter::Queued).unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].seqnum, SeqNum(2));
    assert_eq!(q.len(), 1);
    assert!(q.marker_path().exists(), "running event keeps the marker present");
}

#[test]
fn cleanup_any_drops_everything_and_removes_marker() {
    let pid = std::process::id();
    let mut q = queue();
    q.insert(pid, dev(1, "/devices/pci/sda")).unwrap();
    q.attach(SeqNum(1), WorkerId(42));

    let removed = q.cleanup(pid, CleanupFilter::Any).unwrap();
    assert_eq!(removed.len(), 1);
    assert!(q.is_empty());
    assert!(!q.marker_path().exists());
}

#[test]
fn parent_child_devpath_blocks_regardless_of_direction() {
    let pid = std::process::id();
    let mut q = queue();
    q.insert(pid, dev(1, "/devices/pci/0000:00")).unwrap();
    q.insert(pid, dev(2, "/devices/pci/0000:00/0000:01")).unwrap();
    assert!(q.is_busy(SeqNum(2)));
}

#[test]
fn find_by_sysname_returns_most_recently_inserted_match() {
    let pid = std::process::id();
    let mut q = queue();
    let mut first = dev(1, "/devices/pci/sda");
    first.sysname = "sda".to_string();
    let mut second = dev(2, "/devices/pci/sdb");
    second.sysname = "sdb".to_string();
    q.insert(pid, first).unwrap();
    q.insert(pid, second).unwrap();

    assert_eq!(q.find_by_sysname("sdb").unwrap().seqnum, SeqNum(2));
    assert!(q.find_by_sysname("sdc").is_none());
}
