use trellis_core::{RoomId, ServerMessage};
use trellis_server::SignalingService;

use crate::integration::init_tracing;
use crate::utils::TestPeer;

/// Abrupt transport close: remaining members hear exactly one departure and
/// the connection stops being routable.
#[tokio::test]
async fn test_abrupt_disconnect_broadcasts_departure() {
    init_tracing();

    let service = SignalingService::new();
    let room = RoomId::from("r1");

    let mut a = TestPeer::attach(&service);
    let b = TestPeer::attach(&service);
    let mut c = TestPeer::attach(&service);

    for peer in [&a.id, &b.id, &c.id] {
        service.join_room(peer, &room);
    }
    a.drain();
    c.drain();

    // No leave-room first: the transport just dies.
    service.disconnect(&b.id);

    let expected = vec![ServerMessage::UserDisconnected {
        peer_id: b.id.clone(),
    }];
    assert_eq!(a.drain(), expected);
    assert_eq!(c.drain(), expected);
    assert!(!service.is_connected(&b.id));
}

/// Explicit leave followed by the transport closing must not produce a second
/// departure broadcast.
#[tokio::test]
async fn test_leave_then_disconnect_broadcasts_once() {
    init_tracing();

    let service = SignalingService::new();
    let room = RoomId::from("r1");

    let mut a = TestPeer::attach(&service);
    let b = TestPeer::attach(&service);

    service.join_room(&a.id, &room);
    service.join_room(&b.id, &room);
    a.drain();

    service.leave_room(&b.id);
    service.disconnect(&b.id);

    assert_eq!(
        a.drain(),
        vec![ServerMessage::UserDisconnected {
            peer_id: b.id.clone()
        }]
    );
}
