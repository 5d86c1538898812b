mod support;

use futures::{SinkExt, StreamExt};
use runmate_client::{ChannelListener, ClientConfig, SessionRuntime};
use runmate_core::{LinkState, Notification, Phase, ResultCode, RunParameters, WireEvent};
use serde_json::json;
use std::time::Duration;
use support::{init_test_tracing, wait_for};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{Framed, LinesCodec};

type RelayConn = Framed<TcpStream, LinesCodec>;

async fn relay() -> (TcpListener, ClientConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = ClientConfig::new(format!("tcp://127.0.0.1:{port}/matching"))
        .with_connect_timeout(Duration::from_secs(2));
    (listener, config)
}

async fn accept(listener: &TcpListener) -> RelayConn {
    let (stream, _) = tokio::time::timeout(Duration::from_secs(2), listener.accept())
        .await
        .expect("client never dialed")
        .unwrap();
    Framed::new(stream, LinesCodec::new())
}

async fn read_frame(conn: &mut RelayConn) -> WireEvent {
    let line = tokio::time::timeout(Duration::from_secs(2), conn.next())
        .await
        .expect("no frame from client")
        .expect("client closed the link")
        .unwrap();
    serde_json::from_str(&line).unwrap()
}

async fn write_frame(conn: &mut RelayConn, event: &str, args: Vec<serde_json::Value>) {
    let line = serde_json::to_string(&WireEvent::new(event, args)).unwrap();
    conn.send(line).await.unwrap();
}

#[tokio::test]
async fn test_session_over_loopback_relay() {
    init_test_tracing();
    let (listener, config) = relay().await;
    let mut runtime = SessionRuntime::connect(&config);
    let handle = runtime.handle();
    let (session_listener, mut notifications) = ChannelListener::new();

    handle
        .join("tok1", RunParameters::new(600, 1, 0).unwrap(), session_listener)
        .await
        .unwrap();

    let mut conn = accept(&listener).await;
    assert_eq!(
        read_frame(&mut conn).await,
        WireEvent::new("joinRoom", vec![json!("tok1"), json!(600), json!(1), json!(0)])
    );
    wait_for(runtime.subscribe(), |s| s.link == LinkState::Online).await;

    conn.send("this is not json".to_string()).await.unwrap();
    write_frame(&mut conn, "roomCreated", vec![json!("room42")]).await;

    assert_eq!(
        read_frame(&mut conn).await,
        WireEvent::new("startCount", vec![json!("room42")])
    );
    let (code, _) = notifications.recv().await.unwrap();
    assert_eq!(code, ResultCode::RoomAssigned);

    write_frame(&mut conn, "leaveRoom", vec![]).await;
    wait_for(runtime.subscribe(), |s| s.phase == Phase::Closed).await;

    let eof = tokio::time::timeout(Duration::from_secs(2), conn.next())
        .await
        .expect("client kept the link open");
    assert!(eof.is_none());

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_refused_connection_notifies_listener() {
    init_test_tracing();
    let (listener, config) = relay().await;
    drop(listener);

    let mut runtime = SessionRuntime::connect(&config);
    let handle = runtime.handle();
    let (session_listener, mut notifications) = ChannelListener::new();

    handle
        .join("tok1", RunParameters::new(600, 1, 0).unwrap(), session_listener)
        .await
        .unwrap();

    let (code, notification) =
        tokio::time::timeout(Duration::from_secs(3), notifications.recv())
            .await
            .expect("no connection notification")
            .unwrap();

    assert_eq!(code, ResultCode::ConnectionError);
    assert!(matches!(
        notification,
        Notification::ConnectionError { reason: Some(_) }
    ));
    assert_eq!(runtime.snapshot().phase, Phase::AwaitingRoom);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_relay_hangup_marks_link_lost() {
    init_test_tracing();
    let (listener, config) = relay().await;
    let mut runtime = SessionRuntime::connect(&config);
    let handle = runtime.handle();
    let (session_listener, _notifications) = ChannelListener::new();

    handle
        .join("tok1", RunParameters::new(600, 1, 0).unwrap(), session_listener)
        .await
        .unwrap();
    let conn = accept(&listener).await;
    wait_for(runtime.subscribe(), |s| s.link == LinkState::Online).await;

    drop(conn);

    let snapshot = wait_for(runtime.subscribe(), |s| s.link == LinkState::Connecting).await;
    assert_eq!(snapshot.phase, Phase::AwaitingRoom);

    runtime.shutdown().await;
}
