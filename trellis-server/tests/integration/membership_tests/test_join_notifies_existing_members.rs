use trellis_core::{RoomId, ServerMessage};
use trellis_server::SignalingService;

use crate::integration::init_tracing;
use crate::utils::TestPeer;

#[tokio::test]
async fn test_join_notifies_existing_members() {
    init_tracing();

    let service = SignalingService::new();
    let room = RoomId::from("r1");

    let mut a = TestPeer::attach(&service);
    let mut b = TestPeer::attach(&service);

    service.join_room(&a.id, &room);
    assert!(a.drain().is_empty(), "First member has nobody to hear from");

    service.join_room(&b.id, &room);

    // Existing members hear about the newcomer; the newcomer hears nothing.
    assert_eq!(
        a.drain(),
        vec![ServerMessage::UserConnected {
            peer_id: b.id.clone()
        }]
    );
    assert!(b.drain().is_empty());
}

#[tokio::test]
async fn test_rejoining_same_room_notifies_nobody_twice() {
    init_tracing();

    let service = SignalingService::new();
    let room = RoomId::from("r1");

    let mut a = TestPeer::attach(&service);
    let b = TestPeer::attach(&service);

    service.join_room(&a.id, &room);
    service.join_room(&b.id, &room);
    a.drain();

    service.join_room(&b.id, &room);
    assert!(a.drain().is_empty(), "Idempotent join must not re-broadcast");
    assert_eq!(service.registry().members(&room).len(), 2);
}
