use super::*;
use udevd_core::{Action, DevNum, SeqNum};

fn device() -> Device {
    Device {
        seqnum: SeqNum(1),
        devpath: "/devices/pci/sda".to_string(),
        devpath_old: None,
        devnum: DevNum::NONE,
        ifindex: None,
        subsystem: "block".to_string(),
        devtype: None,
        action: Action::Add,
        sysname: "sda".to_string(),
    }
}

#[tokio::test]
async fn set_env_overlays_a_matching_property_onto_applied_events() {
    let engine = PropertyOverrideRuleEngine::new();
    engine.set_env("DEVTYPE".to_string(), Some("partition".to_string()));

    let mut dev = device();
    engine.apply_to_event(&mut dev).await.unwrap();
    assert_eq!(dev.devtype.as_deref(), Some("partition"));
}

#[tokio::test]
async fn unsetting_a_property_stops_it_from_being_applied() {
    let engine = PropertyOverrideRuleEngine::new();
    engine.set_env("DEVTYPE".to_string(), Some("partition".to_string()));
    engine.set_env("DEVTYPE".to_string(), None);

    let mut dev = device();
    engine.apply_to_event(&mut dev).await.unwrap();
    assert_eq!(dev.devtype, None);
}
