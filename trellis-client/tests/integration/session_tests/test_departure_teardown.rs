use trellis_core::{PeerId, ServerMessage};

use crate::integration::init_tracing;
use crate::utils::{MockTransportFactory, candidate, connected_orchestrator};

/// Room {A, B, C} seen from A: B drops abruptly. A's negotiation count goes
/// down by one, B's transport is closed, and stray messages tagged from B are
/// ignored afterwards.
#[tokio::test]
async fn test_departure_closes_and_removes_the_negotiation() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (mut orchestrator, _events) = connected_orchestrator(factory.clone()).await;
    let b = PeerId::new();
    let c = PeerId::new();

    for peer in [&b, &c] {
        orchestrator
            .handle_message(ServerMessage::UserConnected {
                peer_id: peer.clone(),
            })
            .await;
    }
    assert_eq!(orchestrator.participant_count(), 3);

    orchestrator
        .handle_message(ServerMessage::UserDisconnected { peer_id: b.clone() })
        .await;

    assert_eq!(orchestrator.participant_count(), 2);
    assert!(orchestrator.session(&b).is_none());
    assert!(factory.transport(&b).await.closed().await);

    // A straggler candidate from B must not resurrect the negotiation.
    orchestrator
        .handle_message(ServerMessage::IceCandidate {
            from: b.clone(),
            candidate: candidate(9),
        })
        .await;
    assert!(orchestrator.session(&b).is_none());
    assert!(orchestrator.session(&c).is_some());
}
