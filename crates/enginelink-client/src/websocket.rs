//! [`Transport`] over a WebSocket, using tokio-tungstenite.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};
use url::Url;

use crate::transport::{ConnectionState, Transport, TransportEvent};

/// How long a graceful close waits for the peer's close frame.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// WebSocket transport. Each `open` spawns one pump task that owns the
/// socket; the session talks to it through channels.
#[derive(Debug, Default)]
pub struct WebSocketTransport {
    outgoing: Option<mpsc::UnboundedSender<Message>>,
    events: Option<mpsc::UnboundedReceiver<TransportEvent>>,
    task: Option<JoinHandle<()>>,
    open: Arc<AtomicBool>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for WebSocketTransport {
    fn open(&mut self, url: &Url) {
        self.close();

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));

        self.task = Some(tokio::spawn(pump(
            url.clone(),
            out_rx,
            event_tx,
            Arc::clone(&open),
        )));
        self.outgoing = Some(out_tx);
        self.events = Some(event_rx);
        self.open = open;
    }

    fn close(&mut self) {
        self.events = None;
        let was_open = self.open.swap(false, Ordering::SeqCst);
        // Dropping the sender asks the pump for a graceful close.
        self.outgoing = None;
        if let Some(task) = self.task.take() {
            if !was_open {
                task.abort();
            }
        }
    }

    fn is_open(&self) -> bool {
        self.outgoing.is_some() && self.open.load(Ordering::SeqCst)
    }

    fn send_text(&mut self, text: String) -> bool {
        if !self.is_open() {
            return false;
        }
        match self.outgoing {
            Some(ref tx) => tx.send(Message::Text(text.into())).is_ok(),
            None => false,
        }
    }

    async fn next_event(&mut self) -> Option<TransportEvent> {
        let Some(events) = self.events.as_mut() else {
            return std::future::pending().await;
        };
        let event = events.recv().await;
        if event.is_none() {
            self.events = None;
        }
        event
    }
}

async fn pump(
    url: Url,
    mut outgoing: mpsc::UnboundedReceiver<Message>,
    events: mpsc::UnboundedSender<TransportEvent>,
    open: Arc<AtomicBool>,
) {
    let emit = |event: TransportEvent| {
        // The session may already have moved on; nothing to deliver to.
        let _ = events.send(event);
    };

    emit(TransportEvent::StateChanged(ConnectionState::Connecting));
    let socket = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((socket, _response)) => socket,
        Err(e) => {
            warn!(url = %url, error = %e, "websocket connect failed");
            emit(TransportEvent::Error(e.to_string()));
            emit(TransportEvent::StateChanged(ConnectionState::Disconnected));
            return;
        }
    };
    debug!(url = %url, "websocket connected");
    open.store(true, Ordering::SeqCst);
    emit(TransportEvent::StateChanged(ConnectionState::Connected));
    emit(TransportEvent::Connected);

    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            message = outgoing.recv() => match message {
                Some(message) => {
                    if let Err(e) = sink.send(message).await {
                        emit(TransportEvent::Error(e.to_string()));
                        break;
                    }
                }
                None => {
                    open.store(false, Ordering::SeqCst);
                    emit(TransportEvent::AboutToClose);
                    emit(TransportEvent::StateChanged(ConnectionState::Closing));
                    let _ = sink.close().await;
                    let drain = async { while let Some(Ok(_)) = stream.next().await {} };
                    let _ = tokio::time::timeout(CLOSE_TIMEOUT, drain).await;
                    break;
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    emit(TransportEvent::Text(text.as_str().to_owned()))
                }
                Some(Ok(Message::Binary(data))) => emit(TransportEvent::Binary(data.to_vec())),
                Some(Ok(Message::Close(_))) => {
                    open.store(false, Ordering::SeqCst);
                    emit(TransportEvent::AboutToClose);
                    emit(TransportEvent::StateChanged(ConnectionState::Closing));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    emit(TransportEvent::Error(e.to_string()));
                    break;
                }
                None => break,
            },
        }
    }

    open.store(false, Ordering::SeqCst);
    debug!(url = %url, "websocket closed");
    emit(TransportEvent::StateChanged(ConnectionState::Disconnected));
    emit(TransportEvent::Disconnected);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closed_transport_refuses_to_send() {
        let mut transport = WebSocketTransport::new();
        assert!(!transport.is_open());
        assert!(!transport.send_text("SockeTextMessage,".to_string()));
        transport.close();
        transport.close();
        assert!(!transport.is_open());
    }

    #[tokio::test]
    async fn failed_connect_reports_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut transport = WebSocketTransport::new();
        transport.open(&Url::parse(&format!("ws://127.0.0.1:{}/x", port)).unwrap());

        assert_eq!(
            transport.next_event().await,
            Some(TransportEvent::StateChanged(ConnectionState::Connecting))
        );
        assert!(matches!(
            transport.next_event().await,
            Some(TransportEvent::Error(_))
        ));
        assert_eq!(
            transport.next_event().await,
            Some(TransportEvent::StateChanged(ConnectionState::Disconnected))
        );
        assert_eq!(transport.next_event().await, None);
        assert!(!transport.is_open());
    }
}
