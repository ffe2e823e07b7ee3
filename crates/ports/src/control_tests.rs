use super::*;

#[test]
fn decodes_every_bare_keyword() {
    assert_eq!(decode("STOP_EXEC_QUEUE").unwrap(), ControlMessage::StopExecQueue);
    assert_eq!(decode("START_EXEC_QUEUE").unwrap(), ControlMessage::StartExecQueue);
    assert_eq!(decode("RELOAD").unwrap(), ControlMessage::Reload);
    assert_eq!(decode("PING").unwrap(), ControlMessage::Ping);
    assert_eq!(decode("EXIT").unwrap(), ControlMessage::Exit);
}

#[test]
fn decodes_set_log_level_and_children_max() {
    assert_eq!(decode("SET_LOG_LEVEL=7").unwrap(), ControlMessage::SetLogLevel(7));
    assert_eq!(decode("SET_CHILDREN_MAX=12").unwrap(), ControlMessage::SetChildrenMax(12));
}

#[test]
fn decodes_set_env_with_value_and_with_empty_value_as_unset() {
    assert_eq!(
        decode("SET_ENV=FOO=bar").unwrap(),
        ControlMessage::SetEnv { key: "FOO".to_string(), value: Some("bar".to_string()) }
    );
    assert_eq!(
        decode("SET_ENV=FOO=").unwrap(),
        ControlMessage::SetEnv { key: "FOO".to_string(), value: None }
    );
}

#[test]
fn rejects_set_env_without_an_equals_sign() {
    assert!(decode("SET_ENV=FOO").is_err());
}

#[test]
fn rejects_unknown_keywords() {
    assert!(decode("NOT_A_REAL_MESSAGE").is_err());
}

#[tokio::test]
async fn fake_channel_delivers_enqueued_messages() {
    let (channel, sender) = FakeControlChannel::new();
    sender.send(ControlMessage::Ping).await.unwrap();
    channel.accept().await.unwrap();
    assert_eq!(channel.receive().await.unwrap(), ControlMessage::Ping);
}
