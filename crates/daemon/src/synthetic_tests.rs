use super::*;

fn write_uevent_stub(dir: &Path) {
    std::fs::write(dir.join("uevent"), b"").unwrap();
}

#[test]
fn non_disk_device_writes_change_to_its_own_uevent() {
    let dir = tempfile::tempdir().unwrap();
    write_uevent_stub(dir.path());

    handle_close_write(
        ClosedDevice { syspath: dir.path(), subsystem: "tty", devtype: None, sysname: "ttyS0" },
        "/dev/ttyS0",
    );

    let contents = std::fs::read_to_string(dir.path().join("uevent")).unwrap();
    assert_eq!(contents, "change");
}

#[test]
fn whole_disk_with_no_reread_falls_back_to_change_on_disk_and_partitions() {
    let dir = tempfile::tempdir().unwrap();
    write_uevent_stub(dir.path());
    let part_dir = dir.path().join("sda1");
    std::fs::create_dir(&part_dir).unwrap();
    write_uevent_stub(&part_dir);
    // A sibling directory that isn't a partition of this disk must be
    // left untouched.
    let unrelated = dir.path().join("holders");
    std::fs::create_dir(&unrelated).unwrap();

    handle_close_write(
        ClosedDevice { syspath: dir.path(), subsystem: "block", devtype: Some("disk"), sysname: "sda" },
        "/dev/sda",
    );

    assert_eq!(std::fs::read_to_string(dir.path().join("uevent")).unwrap(), "change");
    assert_eq!(std::fs::read_to_string(part_dir.join("uevent")).unwrap(), "change");
    assert!(!unrelated.join("uevent").exists());
}

#[test]
fn device_mapper_disk_is_treated_as_non_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_uevent_stub(dir.path());

    handle_close_write(
        ClosedDevice {
            syspath: dir.path(),
            subsystem: "block",
            devtype: Some("disk"),
            sysname: "dm-0",
        },
        "/dev/dm-0",
    );

    // Still just a single write to its own uevent; no partition scan.
    assert_eq!(std::fs::read_to_string(dir.path().join("uevent")).unwrap(), "change");
}
