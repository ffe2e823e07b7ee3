use super::*;

#[tokio::test]
async fn watch_assigns_ascending_descriptors_and_resolves_back() {
    let mut inotify = FakeInotify::new();
    let wd1 = inotify.watch("/dev/sda").await.unwrap();
    let wd2 = inotify.watch("/dev/sdb").await.unwrap();
    assert_ne!(wd1, wd2);
    assert_eq!(inotify.resolve(wd1), Some("/dev/sda"));
    assert_eq!(inotify.resolve(wd2), Some("/dev/sdb"));
}

#[tokio::test]
async fn ignored_event_forgets_the_watch() {
    let mut inotify = FakeInotify::new();
    let wd = inotify.watch("/dev/sda").await.unwrap();
    inotify.push_event(WatchEvent::Ignored(wd));

    let events = inotify.read_events().await.unwrap();
    assert_eq!(events, vec![WatchEvent::Ignored(wd)]);
    assert_eq!(inotify.resolve(wd), None);
}

#[tokio::test]
async fn close_write_event_keeps_the_watch_resolvable() {
    let mut inotify = FakeInotify::new();
    let wd = inotify.watch("/dev/sda").await.unwrap();
    inotify.push_event(WatchEvent::CloseWrite(wd));

    let events = inotify.read_events().await.unwrap();
    assert_eq!(events, vec![WatchEvent::CloseWrite(wd)]);
    assert_eq!(inotify.resolve(wd), Some("/dev/sda"));
}
