//! Socket and message behaviour against a live engine.
//!
//! Everything here runs over inproc or loopback endpoints, so no external
//! services are needed. Where pub/sub is involved a short settle sleep gives
//! the subscription time to reach the publisher, same as any libzmq test.

use std::thread;
use std::time::Duration;

use cowling::{
    Context, CowlingError, Message, SendOutcome, SendRecvFlags, SocketOption, SocketType,
};

/// Give engine background plumbing (subscriptions, connects) time to settle.
fn settle() {
    thread::sleep(Duration::from_millis(100));
}

#[test]
fn test_pubsub_scenario() {
    cowling::dev_tracing::init_tracing();

    let context = Context::new();

    let publisher = context.socket(SocketType::Pub).unwrap();
    publisher.bind("inproc://pubsub-scenario").unwrap();

    let subscriber = context.socket(SocketType::Sub).unwrap();
    subscriber.connect("inproc://pubsub-scenario").unwrap();
    subscriber.subscribe("t").unwrap();
    settle();

    let outcome = publisher
        .send(Message::new().push_str("t").push_str("payload"), false)
        .unwrap();
    assert!(outcome.is_sent());

    let mut received = Message::new();
    assert!(subscriber.receive(&mut received, false).unwrap());

    assert_eq!(received.parts(), 2);
    assert_eq!(received.get(0).unwrap(), "t");
    assert_eq!(received.get(1).unwrap(), "payload");
    assert!(!subscriber.has_more_parts().unwrap());
}

#[test]
fn test_multipart_order_preserved() {
    let context = Context::new();

    let left = context.socket(SocketType::Pair).unwrap();
    left.bind("inproc://pair-order").unwrap();
    let right = context.socket(SocketType::Pair).unwrap();
    right.connect("inproc://pair-order").unwrap();

    let message = Message::new()
        .push_str("envelope")
        .push_empty()
        .push(&b"\x00\x01\x02"[..])
        .push(0xDEAD_BEEF_u32);
    assert!(left.send(message, false).unwrap().is_sent());

    let mut received = Message::new();
    assert!(right.receive(&mut received, false).unwrap());

    assert_eq!(received.parts(), 4);
    assert_eq!(received.get(0).unwrap(), "envelope");
    assert!(received.get(1).unwrap().is_empty());
    assert_eq!(received.get(2).unwrap(), &[0u8, 1, 2][..]);
    assert_eq!(&received.get(3).unwrap()[..], &0xDEAD_BEEF_u32.to_ne_bytes());
}

#[test]
fn test_send_empty_message_is_invalid_usage() {
    let context = Context::new();
    let socket = context.socket(SocketType::Pair).unwrap();
    socket.bind("inproc://empty-send").unwrap();

    let err = socket.send(Message::new(), false).unwrap_err();
    assert!(matches!(err, CowlingError::EmptyMessage));
    assert!(err.is_invalid_usage());
}

#[test]
fn test_receive_into_nonempty_message_is_invalid_usage() {
    let context = Context::new();
    let socket = context.socket(SocketType::Pull).unwrap();
    socket.bind("inproc://partial-receive").unwrap();

    let mut partial = Message::new().push_str("leftover");
    let err = socket.receive(&mut partial, true).unwrap_err();
    assert!(matches!(err, CowlingError::MessageNotEmpty));
    assert_eq!(partial.parts(), 1);
}

#[test]
fn test_would_block_send_hands_message_back_intact() {
    let context = Context::new();

    // A PUSH socket with no peer cannot accept anything.
    let push = context.socket(SocketType::Push).unwrap();
    push.bind("inproc://no-puller").unwrap();

    let message = Message::new().push_str("t").push_str("payload");
    match push.send(message, true).unwrap() {
        SendOutcome::Sent => panic!("send with no peer should not complete"),
        SendOutcome::WouldBlock(returned) => {
            assert_eq!(returned.parts(), 2);
            assert_eq!(returned.get(0).unwrap(), "t");
            assert_eq!(returned.get(1).unwrap(), "payload");
        }
    }
}

#[test]
fn test_nonblocking_receive_with_nothing_ready() {
    let context = Context::new();
    let pull = context.socket(SocketType::Pull).unwrap();
    pull.bind("inproc://nothing-ready").unwrap();

    let mut message = Message::new();
    assert!(!pull.receive(&mut message, true).unwrap());
    assert!(message.is_empty());
}

#[test]
fn test_single_part_operations_and_more_flag() {
    let context = Context::new();

    let left = context.socket(SocketType::Pair).unwrap();
    left.bind("inproc://hand-framed").unwrap();
    let right = context.socket(SocketType::Pair).unwrap();
    right.connect("inproc://hand-framed").unwrap();

    assert!(left
        .send_part("header", SendRecvFlags::SEND_MORE)
        .unwrap());
    assert!(left.send_part("body", SendRecvFlags::empty()).unwrap());

    let header = right.receive_part(SendRecvFlags::empty()).unwrap().unwrap();
    assert_eq!(header, "header");
    assert!(right.has_more_parts().unwrap());

    let body = right.receive_string(SendRecvFlags::empty()).unwrap().unwrap();
    assert_eq!(body, "body");
    assert!(!right.has_more_parts().unwrap());

    // Nothing further queued.
    assert!(right
        .receive_part(SendRecvFlags::DONT_WAIT)
        .unwrap()
        .is_none());
}

#[test]
fn test_receive_raw_truncates_to_caller_buffer() {
    let context = Context::new();

    let left = context.socket(SocketType::Pair).unwrap();
    left.bind("inproc://truncate").unwrap();
    let right = context.socket(SocketType::Pair).unwrap();
    right.connect("inproc://truncate").unwrap();

    assert!(left
        .send_part("hello world", SendRecvFlags::empty())
        .unwrap());

    let mut buffer = [0u8; 5];
    let written = right
        .receive_raw(&mut buffer, SendRecvFlags::empty())
        .unwrap()
        .unwrap();
    assert_eq!(written, 5);
    assert_eq!(&buffer, b"hello");
}

#[test]
fn test_req_rep_round_trip() {
    let context = Context::new();

    let responder = context.socket(SocketType::Rep).unwrap();
    responder.bind("inproc://req-rep").unwrap();
    let requester = context.socket(SocketType::Req).unwrap();
    requester.connect("inproc://req-rep").unwrap();

    assert!(requester
        .send(Message::new().push_str("ping"), false)
        .unwrap()
        .is_sent());

    let mut request = Message::new();
    assert!(responder.receive(&mut request, false).unwrap());
    assert_eq!(request.get(0).unwrap(), "ping");

    assert!(responder
        .send(Message::new().push_str("pong"), false)
        .unwrap()
        .is_sent());

    let mut reply = Message::new();
    assert!(requester.receive(&mut reply, false).unwrap());
    assert_eq!(reply.get(0).unwrap(), "pong");
}

#[test]
fn test_push_pull_over_tcp() {
    let context = Context::new();
    let port = portpicker::pick_unused_port().expect("no free port");
    let endpoint = format!("tcp://127.0.0.1:{port}");

    let pull = context.socket(SocketType::Pull).unwrap();
    pull.bind(&endpoint).unwrap();
    let push = context.socket(SocketType::Push).unwrap();
    push.connect(&endpoint).unwrap();

    assert!(push
        .send(Message::new().push_str("job").push(7_u64), false)
        .unwrap()
        .is_sent());

    let mut received = Message::new();
    assert!(pull.receive(&mut received, false).unwrap());
    assert_eq!(received.parts(), 2);
    assert_eq!(received.get(0).unwrap(), "job");
}

#[test]
fn test_engine_rejections_surface_as_transport_errors() {
    let context = Context::new();
    let socket = context.socket(SocketType::Pair).unwrap();

    let err = socket.bind("bogus://nowhere").unwrap_err();
    assert!(err.is_transport());

    // A REQ socket must send before it may receive; the engine rejects the
    // out-of-order call and the rejection is not a would-block outcome.
    let requester = context.socket(SocketType::Req).unwrap();
    requester.bind("inproc://req-out-of-order").unwrap();
    let mut message = Message::new();
    let err = requester.receive(&mut message, true).unwrap_err();
    assert!(err.is_transport());
}

#[test]
fn test_typed_option_whitelists() {
    let context = Context::new();
    let socket = context.socket(SocketType::Sub).unwrap();

    // Matching types pass through to the engine and read back.
    socket.set_int(SocketOption::Linger, 0).unwrap();
    assert_eq!(socket.get_int(SocketOption::Linger).unwrap(), 0);

    socket
        .set_int(SocketOption::SendHighWaterMark, 500)
        .unwrap();
    assert_eq!(
        socket.get_int(SocketOption::SendHighWaterMark).unwrap(),
        500
    );

    // Mismatched types are rejected at the boundary, not coerced.
    assert!(matches!(
        socket.set_int(SocketOption::Subscribe, 1),
        Err(CowlingError::OptionType { .. })
    ));
    assert!(matches!(
        socket.set_bool(SocketOption::Linger, true),
        Err(CowlingError::OptionType { .. })
    ));
    assert!(matches!(
        socket.set_string(SocketOption::Linger, "x"),
        Err(CowlingError::OptionType { .. })
    ));
    assert!(matches!(
        socket.get_u64(SocketOption::Linger),
        Err(CowlingError::OptionType { .. })
    ));
    assert!(matches!(
        socket.get_bool(SocketOption::Affinity),
        Err(CowlingError::OptionType { .. })
    ));
}

#[test]
fn test_affinity_accepts_int_and_u64() {
    let context = Context::new();
    let socket = context.socket(SocketType::Dealer).unwrap();

    socket.set_u64(SocketOption::Affinity, 3).unwrap();
    assert_eq!(socket.get_u64(SocketOption::Affinity).unwrap(), 3);

    // The int path forwards non-negative values to the u64 option.
    socket.set_int(SocketOption::Affinity, 7).unwrap();
    assert_eq!(socket.get_u64(SocketOption::Affinity).unwrap(), 7);

    assert!(matches!(
        socket.set_int(SocketOption::Affinity, -1),
        Err(CowlingError::NegativeValue(SocketOption::Affinity))
    ));
}

#[test]
fn test_string_options_and_generic_get() {
    let context = Context::new();
    let socket = context.socket(SocketType::Dealer).unwrap();

    socket.set_string(SocketOption::Identity, "node-1").unwrap();
    assert_eq!(
        socket.get_string(SocketOption::Identity).unwrap(),
        "node-1"
    );

    socket.bind("inproc://last-endpoint").unwrap();
    let endpoint: String = socket.get(SocketOption::LastEndpoint).unwrap();
    assert_eq!(endpoint, "inproc://last-endpoint");

    let hwm: i32 = socket.get(SocketOption::ReceiveHighWaterMark).unwrap();
    assert!(hwm >= 0);
}

#[test]
fn test_subscribe_all_topics() {
    let context = Context::new();

    let publisher = context.socket(SocketType::Pub).unwrap();
    publisher.bind("inproc://multi-topic").unwrap();

    let subscriber = context.socket(SocketType::Sub).unwrap();
    subscriber.connect("inproc://multi-topic").unwrap();
    subscriber.subscribe_all(["alpha", "beta"]).unwrap();
    settle();

    assert!(publisher
        .send(Message::new().push_str("beta").push_str("2"), false)
        .unwrap()
        .is_sent());
    assert!(publisher
        .send(Message::new().push_str("gamma").push_str("dropped"), false)
        .unwrap()
        .is_sent());
    assert!(publisher
        .send(Message::new().push_str("alpha").push_str("1"), false)
        .unwrap()
        .is_sent());

    let mut first = Message::new();
    assert!(subscriber.receive(&mut first, false).unwrap());
    assert_eq!(first.get(0).unwrap(), "beta");

    let mut second = Message::new();
    assert!(subscriber.receive(&mut second, false).unwrap());
    assert_eq!(second.get(0).unwrap(), "alpha");

    // The unsubscribed topic never arrives.
    let mut none = Message::new();
    assert!(!subscriber.receive(&mut none, true).unwrap());
}
