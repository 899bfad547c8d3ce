//! Drives a real WebSocket session against an in-process engine stub.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message as Frame;

use enginelink_client::{LocalFileStore, Session, SessionEvent, WebSocketTransport};
use enginelink_core::LogHub;
use enginelink_protocol::{
    ConnectionInformation, DirectoryType, FileMessage, LogMessage, LogType, Message, MessageCodec,
    MessageKind, Registry, RequestIds,
};

const STEP: Duration = Duration::from_secs(5);

type EngineSocket = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

async fn recv(socket: &mut EngineSocket, codec: &MessageCodec) -> Message {
    loop {
        let frame = tokio::time::timeout(STEP, socket.next())
            .await
            .expect("engine timed out")
            .expect("client went away")
            .expect("frame error");
        if let Frame::Text(text) = frame {
            return codec.decode(text.as_str()).expect("engine could not decode");
        }
    }
}

async fn send(socket: &mut EngineSocket, codec: &MessageCodec, message: Message) {
    let text = codec.encode(&message).unwrap();
    socket.send(Frame::Text(text.into())).await.unwrap();
}

async fn next(session: &mut Session<WebSocketTransport, LocalFileStore>) -> SessionEvent {
    tokio::time::timeout(STEP, session.next_event())
        .await
        .expect("session timed out")
        .expect("transport ended")
}

#[tokio::test]
async fn handshake_logs_and_download() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let engine = tokio::spawn(async move {
        let codec = MessageCodec::new().with_registry(Registry::Engine);
        let (stream, _) = listener.accept().await.unwrap();
        let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();

        let query = recv(&mut socket, &codec).await;
        assert_eq!(query.kind(), MessageKind::Request);
        let Message::ConnectionInformation(identity) = recv(&mut socket, &codec).await else {
            panic!("expected the client identity");
        };
        assert_eq!(identity.request_id, -1);

        send(
            &mut socket,
            &codec,
            ConnectionInformation {
                request_id: 0,
                application_name: "stub-engine".into(),
                uuid: "0000".into(),
                device_name: "bench".into(),
                device_model: "test".into(),
            }
            .into(),
        )
        .await;
        send(
            &mut socket,
            &codec,
            LogMessage {
                log_type: LogType::Warning,
                time: "12:00:00".into(),
                text: "low memory".into(),
                stack_trace: String::new(),
            }
            .into(),
        )
        .await;

        let Message::FileUploadRequest(request) = recv(&mut socket, &codec).await else {
            panic!("expected a file request");
        };
        assert_eq!(request.target_path, "saves/slot1.dat");
        assert_eq!(request.directory_type, DirectoryType::PersistentData);
        send(
            &mut socket,
            &codec,
            FileMessage {
                request_id: request.request_id(),
                directory_type: request.directory_type,
                target_path: request.target_path.clone(),
                data: b"slot one".to_vec(),
            }
            .into(),
        )
        .await;

        // Wait for the client to hang up.
        while let Some(Ok(frame)) = socket.next().await {
            if frame.is_close() {
                break;
            }
        }
    });

    let downloads = tempfile::tempdir().unwrap();
    let url = format!("ws://127.0.0.1:{port}/WebSocketApp/takahashi_kenji")
        .parse()
        .unwrap();
    let mut session = Session::new(
        url,
        WebSocketTransport::new(),
        LocalFileStore,
        Arc::new(RequestIds::new()),
        LogHub::new(),
    )
    .with_download_dir(downloads.path());

    session.open();
    assert_eq!(next(&mut session).await, SessionEvent::Connected);
    assert!(session.is_connected());

    let SessionEvent::RemoteInfo(info) = next(&mut session).await else {
        panic!("expected the engine identity");
    };
    assert_eq!(info.application_name, "stub-engine");
    assert_eq!(session.remote(), Some(&info));

    let SessionEvent::RemoteLog(entry) = next(&mut session).await else {
        panic!("expected a log line");
    };
    assert_eq!(entry.text, "low memory");

    let remote = "saves\\slot1.dat";
    assert!(session.download(DirectoryType::PersistentData, remote));
    assert_eq!(session.pending_downloads(), 1);
    let SessionEvent::FileReceived { path, .. } = next(&mut session).await else {
        panic!("expected the downloaded file");
    };
    assert_eq!(path, downloads.path().join("slot1.dat"));
    assert_eq!(std::fs::read(&path).unwrap(), b"slot one");
    assert_eq!(session.pending_downloads(), 0);

    session.close();
    assert!(!session.is_connected());
    tokio::time::timeout(STEP, engine).await.unwrap().unwrap();
}

#[tokio::test]
async fn refused_connection_stays_disconnected() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = format!("ws://127.0.0.1:{port}/").parse().unwrap();
    let mut session = Session::new(
        url,
        WebSocketTransport::new(),
        LocalFileStore,
        Arc::new(RequestIds::new()),
        LogHub::new(),
    );
    session.open();

    // Nothing reaches the application; the session just settles.
    let outcome = tokio::time::timeout(Duration::from_millis(500), session.next_event()).await;
    assert!(!matches!(outcome, Ok(Some(_))));
    assert!(!session.is_connected());
    assert!(!session.send_text("hello"));
}
