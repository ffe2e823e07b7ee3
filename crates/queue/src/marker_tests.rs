use super::*;

#[test]
fn create_then_remove_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue");
    let mut marker = QueueMarker::new(&path, 100);

    marker.create(100).unwrap();
    assert!(marker.is_present());
    assert!(path.exists());

    marker.remove(100).unwrap();
    assert!(!marker.is_present());
    assert!(!path.exists());
}

#[test]
fn non_owning_pid_cannot_create_or_remove() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue");
    let mut marker = QueueMarker::new(&path, 100);

    marker.create(200).unwrap();
    assert!(!marker.is_present());
    assert!(!path.exists());

    marker.create(100).unwrap();
    marker.remove(200).unwrap();
    assert!(marker.is_present(), "non-owner remove must be a no-op");
}

#[test]
fn double_create_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue");
    let mut marker = QueueMarker::new(&path, 100);
    marker.create(100).unwrap();
    marker.create(100).unwrap();
    assert!(marker.is_present());
}
