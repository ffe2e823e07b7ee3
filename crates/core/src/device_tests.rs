use super::*;

fn dev(devpath: &str) -> Device {
    Device {
        seqnum: SeqNum(1),
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
fn is_block_requires_both_devnum_and_subsystem() {
    let mut d = dev("/devices/pci/sda");
    assert!(!d.is_block(), "no devnum yet");
    d.devnum = DevNum { major: 8, minor: 0 };
    assert!(d.is_block());
    d.subsystem = "net".to_string();
    assert!(!d.is_block());
}

#[test]
fn has_ifindex_excludes_zero() {
    let mut d = dev("/devices/pci/eth0");
    assert!(!d.has_ifindex());
    d.ifindex = Some(0);
    assert!(!d.has_ifindex());
    d.ifindex = Some(3);
    assert!(d.has_ifindex());
}

#[test]
fn action_round_trips_through_str() {
    for a in [
        Action::Add,
        Action::Remove,
        Action::Change,
        Action::Move,
        Action::Online,
        Action::Offline,
        Action::Bind,
        Action::Unbind,
    ] {
        assert_eq!(Action::parse(a.as_str()), Some(a));
    }
    assert_eq!(Action::parse("bogus"), None);
}
