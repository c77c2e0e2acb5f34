use trellis_core::RoomId;
use trellis_server::SignalingService;

use crate::integration::init_tracing;
use crate::utils::TestPeer;

#[tokio::test]
async fn test_rooms_do_not_observe_each_other() {
    init_tracing();

    let service = SignalingService::new();
    let r1 = RoomId::from("r1");
    let r2 = RoomId::from("r2");

    let mut a = TestPeer::attach(&service);
    let mut b = TestPeer::attach(&service);

    service.join_room(&a.id, &r1);
    service.join_room(&b.id, &r2);

    let c = TestPeer::attach(&service);
    service.join_room(&c.id, &r2);

    assert!(a.drain().is_empty(), "r1 must not hear r2 joins");
    assert_eq!(b.drain().len(), 1);

    service.disconnect(&c.id);
    assert!(a.drain().is_empty(), "r1 must not hear r2 departures");
    assert_eq!(b.drain().len(), 1);
}
