use trellis_core::{ClientMessage, RoomId, ServerMessage, SessionDescription};
use trellis_server::SignalingService;

use crate::integration::init_tracing;
use crate::utils::TestPeer;

/// A member always hears about a newcomer before it hears the newcomer's
/// first negotiation message.
#[tokio::test]
async fn test_join_notification_precedes_first_offer() {
    init_tracing();

    let service = SignalingService::new();
    let room = RoomId::from("r1");

    let mut a = TestPeer::attach(&service);
    let b = TestPeer::attach(&service);

    service.join_room(&a.id, &room);

    // B joins and immediately offers, as a real client does.
    service.join_room(&b.id, &room);
    service.relay(
        &b.id,
        ClientMessage::Offer {
            to: a.id.clone(),
            offer: SessionDescription::offer("v=0"),
        },
    );

    let delivered = a.drain();
    assert_eq!(delivered.len(), 2);
    assert!(matches!(
        delivered[0],
        ServerMessage::UserConnected { ref peer_id } if *peer_id == b.id
    ));
    assert!(matches!(
        delivered[1],
        ServerMessage::Offer { ref from, .. } if *from == b.id
    ));
}
