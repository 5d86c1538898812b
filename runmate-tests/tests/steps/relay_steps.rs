use cucumber::{given, then, when};
use runmate_core::WireEvent;
use runmate_tests::SessionWorld;
use serde_json::{json, Value};

fn parse_args(args: &str) -> Vec<Value> {
    serde_json::from_str(args).unwrap_or_else(|e| panic!("Invalid args '{}': {}", args, e))
}

// ===== Given Steps =====

#[given("I remember the traffic so far")]
async fn remember_traffic(world: &mut SessionWorld) {
    world.take_checkpoint();
}

// ===== When Steps =====

#[when("I remember the traffic so far")]
async fn remember_traffic_now(world: &mut SessionWorld) {
    world.take_checkpoint();
}

#[when(expr = "the relay sends {string}")]
async fn relay_sends_bare(world: &mut SessionWorld, event: String) {
    world.deliver(WireEvent::bare(event));
}

#[when(expr = "the relay sends {string} with args {string}")]
async fn relay_sends_with_args(world: &mut SessionWorld, event: String, args: String) {
    world.deliver(WireEvent::new(event, parse_args(&args)));
}

#[when(expr = "the relay sends {string} for room {string}")]
async fn relay_sends_for_room(world: &mut SessionWorld, event: String, room: String) {
    world.deliver(WireEvent::new(event, vec![json!(room)]));
}

#[when(expr = "the relay introduces opponent {string} in room {string}")]
async fn relay_introduces_opponent(world: &mut SessionWorld, name: String, room: String) {
    world.deliver(WireEvent::new(
        "opponentInfo",
        vec![json!(room), json!(name), json!(4), json!(7), json!(3), json!(2)],
    ));
}

// ===== Then Steps =====

#[then(expr = "the relay received {string} with args {string}")]
async fn relay_received(world: &mut SessionWorld, event: String, args: String) {
    assert_eq!(world.last_sent(), WireEvent::new(event, parse_args(&args)));
}

#[then(expr = "{int} {string} event(s) was/were sent")]
async fn events_sent(world: &mut SessionWorld, count: usize, event: String) {
    let sent = world
        .transport
        .emitted_names()
        .into_iter()
        .filter(|name| *name == event)
        .count();
    assert_eq!(sent, count, "sent: {:?}", world.transport.emitted_names());
}

#[then(expr = "the relay received events {string}")]
async fn relay_received_sequence(world: &mut SessionWorld, events: String) {
    let expected: Vec<String> = events.split(", ").map(str::to_string).collect();
    assert_eq!(world.transport.emitted_names(), expected);
}

#[then("nothing was sent or notified since")]
async fn nothing_since_checkpoint(world: &mut SessionWorld) {
    assert!(
        world.sent_since_checkpoint().is_empty(),
        "sent: {:?}",
        world.sent_since_checkpoint()
    );
    assert!(
        world.received_since_checkpoint().is_empty(),
        "received: {:?}",
        world.received_since_checkpoint()
    );
}

#[then("the transport is released")]
async fn transport_released(world: &mut SessionWorld) {
    assert!(!world.transport.is_connected());
    assert!(world.transport.subscriptions().is_empty());
    assert_eq!(world.transport.disconnect_count(), 1);
}
