use super::*;

#[test]
fn second_acquire_on_the_same_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let pid_path = dir.path().join("udevd.pid");

    let _first = InstanceLock::acquire(&pid_path).unwrap();
    let second = InstanceLock::acquire(&pid_path);
    assert!(matches!(second, Err(DaemonError::LockFailed(_))));
}

#[test]
fn lock_file_contains_the_current_pid() {
    let dir = tempfile::tempdir().unwrap();
    let pid_path = dir.path().join("udevd.pid");

    let _lock = InstanceLock::acquire(&pid_path).unwrap();
    let contents = std::fs::read_to_string(&pid_path).unwrap();
    assert_eq!(contents.trim(), std::process::id().to_string());
}
