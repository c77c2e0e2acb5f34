use axum::extract::ws::Message;
use tokio::sync::mpsc;
use trellis_core::{PeerId, ServerMessage};
use trellis_server::SignalingService;

/// Fake connected client: registers an outbound channel with the service and
/// decodes everything the relay pushes to it.
pub struct TestPeer {
    pub id: PeerId,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl TestPeer {
    /// Attaches a new connection and swallows the welcome message, asserting
    /// it carries the assigned identifier.
    pub fn attach(service: &SignalingService) -> Self {
        let id = PeerId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        service.add_peer(id.clone(), tx);

        let mut peer = Self { id, rx };
        match peer.try_next() {
            Some(ServerMessage::Welcome { peer_id }) => assert_eq!(peer_id, peer.id),
            other => panic!("Expected welcome on attach, got {other:?}"),
        }
        peer
    }

    /// Next decoded message queued for this peer, if any.
    pub fn try_next(&mut self) -> Option<ServerMessage> {
        match self.rx.try_recv().ok()? {
            Message::Text(text) => {
                Some(serde_json::from_str(&text).expect("invalid server message"))
            }
            _ => None,
        }
    }

    /// Everything currently queued for this peer, in delivery order.
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Some(msg) = self.try_next() {
            out.push(msg);
        }
        out
    }
}
