use super::*;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;

#[tokio::test]
async fn accepts_a_connection_and_decodes_one_message_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("control");
    let channel = UnixControlChannel::bind(&path).unwrap();

    let connect_path = path.clone();
    let client = tokio::spawn(async move {
        let mut stream = UnixStream::connect(&connect_path).await.unwrap();
        stream.write_all(b"PING\n").await.unwrap();
        stream.write_all(b"STOP_EXEC_QUEUE\n").await.unwrap();
    });

    channel.accept().await.unwrap();
    assert_eq!(channel.receive().await.unwrap(), ControlMessage::Ping);
    assert_eq!(channel.receive().await.unwrap(), ControlMessage::StopExecQueue);
    client.await.unwrap();
}

#[tokio::test]
async fn receive_before_accept_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let channel = UnixControlChannel::bind(&dir.path().join("control")).unwrap();
    assert!(channel.receive().await.is_err());
}

#[tokio::test]
async fn closed_connection_is_reported_and_clears_current() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("control");
    let channel = UnixControlChannel::bind(&path).unwrap();

    let connect_path = path.clone();
    tokio::spawn(async move {
        let _stream = UnixStream::connect(&connect_path).await.unwrap();
    });

    channel.accept().await.unwrap();
    assert!(channel.receive().await.is_err());
    assert!(channel.receive().await.is_err());
}
