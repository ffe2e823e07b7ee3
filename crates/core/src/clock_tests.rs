use super::*;

#[test]
fn system_clock_advances_with_wall_time() {
    let clock = SystemClock;
    let a = clock.now();
    std::thread::sleep(Duration::from_millis(5));
    let b = clock.now();
    assert!(b > a);
}

#[test]
fn fake_clock_only_advances_when_told() {
    let clock = FakeClock::new();
    let a = clock.now();
    assert_eq!(clock.now(), a);
    clock.advance(Duration::from_secs(1));
    let b = clock.now();
    assert_eq!(b - a, Duration::from_secs(1));
}

#[test]
fn fake_clock_shared_handle_observes_advance() {
    let clock = FakeClock::new();
    let clone = clock.clone();
    clock.advance(Duration::from_millis(250));
    assert_eq!(clone.now() - clock.epoch, Duration::from_millis(250));
}
