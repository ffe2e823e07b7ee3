use super::*;

#[tokio::test]
async fn fake_engine_tracks_load_calls() {
    let mut engine = FakeRuleEngine::new();
    assert!(engine.is_current());
    engine.load().await.unwrap();
    engine.load().await.unwrap();
    assert_eq!(engine.load_calls.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[tokio::test]
async fn fake_engine_apply_is_a_no_op() {
    let engine = FakeRuleEngine::new();
    let mut device = crate::test_support::sample_device();
    let before = device.clone();
    engine.apply_to_event(&mut device).await.unwrap();
    assert_eq!(device.devpath, before.devpath);
}
