use super::*;

fn sample() -> Device {
    Device {
        seqnum: SeqNum(42),
        devpath: "/devices/virtual/block/loop0".to_string(),
        devpath_old: None,
        devnum: DevNum { major: 7, minor: 0 },
        ifindex: None,
        subsystem: "block".to_string(),
        devtype: Some("disk".to_string()),
        action: Action::Add,
        sysname: "loop0".to_string(),
    }
}

#[test]
fn encode_then_decode_recovers_every_field() {
    let device = sample();
    let decoded = decode(&encode(&device)).unwrap();
    assert_eq!(decoded.seqnum, device.seqnum);
    assert_eq!(decoded.devpath, device.devpath);
    assert_eq!(decoded.subsystem, device.subsystem);
    assert_eq!(decoded.devnum, device.devnum);
    assert_eq!(decoded.devtype, device.devtype);
    assert_eq!(decoded.action, device.action);
    assert_eq!(decoded.sysname, device.sysname);
}

#[test]
fn decode_rejects_a_message_with_no_header_terminator() {
    assert!(decode(b"not a uevent, no null byte anywhere").is_none());
}

#[test]
fn decode_rejects_an_unrecognized_action() {
    let msg = b"frobnicate@/devices/virtual/block/loop0\0ACTION=frobnicate\0";
    assert!(decode(msg).is_none());
}

#[test]
fn decode_falls_back_to_the_devpath_tail_when_sysname_is_missing() {
    let msg = b"add@/devices/virtual/block/loop0\0ACTION=add\0SUBSYSTEM=block\0";
    let decoded = decode(msg).unwrap();
    assert_eq!(decoded.sysname, "loop0");
}
