use cucumber::{given, then, when};
use runmate_core::{JoinOutcome, RunParameters};
use runmate_tests::SessionWorld;

fn join(world: &mut SessionWorld, token: String, duration: i64, gender: i64, lead: i64, listener: &str) {
    let parameters = RunParameters::new(duration, gender, lead).expect("Invalid run parameters");
    let listener = world.listener(listener);
    match world.machine.join(token.into(), parameters, listener) {
        Ok(outcome) => {
            world.last_join = Some(outcome);
            world.last_error = None;
        }
        Err(e) => {
            world.last_join = None;
            world.last_error = Some(e);
        }
    }
}

// ===== Given Steps =====

#[given("a fresh session")]
async fn fresh_session(world: &mut SessionWorld) {
    assert_eq!(world.machine.phase().to_string(), "Idle");
}

#[given(expr = "listener {string} joined with token {string}")]
async fn joined(world: &mut SessionWorld, listener: String, token: String) {
    join(world, token, 600, 1, 0, &listener);
    assert_eq!(world.last_join, Some(JoinOutcome::Started));
}

#[given(expr = "listener {string} is paired with {string} in room {string}")]
async fn paired(world: &mut SessionWorld, listener: String, opponent: String, room: String) {
    joined(world, listener, "tok1".to_string()).await;
    world.deliver(runmate_core::WireEvent::new(
        "roomCreated",
        vec![serde_json::json!(room)],
    ));
    world.deliver(runmate_core::WireEvent::new(
        "roomFull",
        vec![serde_json::json!(room)],
    ));
    world.deliver(runmate_core::WireEvent::new(
        "opponentInfo",
        vec![
            serde_json::json!(room),
            serde_json::json!(opponent),
            serde_json::json!(4),
            serde_json::json!(7),
            serde_json::json!(3),
            serde_json::json!(2),
        ],
    ));
    assert_eq!(world.machine.phase().to_string(), "Ready");
}

// ===== When Steps =====

#[when(expr = "listener {string} joins with token {string} for {int} seconds, gender {int}, lead time {int}")]
async fn joins_with(
    world: &mut SessionWorld,
    listener: String,
    token: String,
    duration: i64,
    gender: i64,
    lead: i64,
) {
    join(world, token, duration, gender, lead, &listener);
}

#[when(expr = "listener {string} joins with token {string}")]
async fn joins(world: &mut SessionWorld, listener: String, token: String) {
    join(world, token, 600, 1, 0, &listener);
}

#[when("I cancel matchmaking")]
async fn cancel(world: &mut SessionWorld) {
    let result = world.machine.cancel();
    world.record(result);
}

// ===== Then Steps =====

#[then(expr = "the join {word}")]
async fn join_outcome(world: &mut SessionWorld, outcome: String) {
    let expected = match outcome.as_str() {
        "started" => JoinOutcome::Started,
        "rebound" => JoinOutcome::Rebound,
        other => panic!("Unknown join outcome '{}'", other),
    };
    assert_eq!(world.last_join, Some(expected));
}

#[then(expr = "the phase is {word}")]
async fn phase_is(world: &mut SessionWorld, phase: String) {
    assert_eq!(world.machine.phase().to_string(), phase);
}

#[then(expr = "the room is {string}")]
async fn room_is(world: &mut SessionWorld, room: String) {
    let assigned = world.machine.room_id().map(|r| r.as_str().to_string());
    assert_eq!(assigned, Some(room));
}

#[then("no room is assigned")]
async fn no_room(world: &mut SessionWorld) {
    assert!(world.machine.room_id().is_none());
}

#[then(expr = "listener {string} received result code {int}")]
async fn listener_received_code(world: &mut SessionWorld, listener: String, code: i32) {
    let codes: Vec<i32> = world
        .received_by(&listener)
        .iter()
        .map(|r| r.code.as_i32())
        .collect();
    assert!(codes.contains(&code), "{} received {:?}", listener, codes);
}

#[then(expr = "listener {string} received nothing")]
async fn listener_received_nothing(world: &mut SessionWorld, listener: String) {
    assert!(world.received_by(&listener).is_empty());
}

#[then(expr = "listener {string} was told the room is {string}")]
async fn listener_told_room(world: &mut SessionWorld, listener: String, room: String) {
    let told = world.received_by(&listener).into_iter().any(|r| {
        matches!(
            r.notification,
            runmate_core::Notification::RoomAssigned { ref room_id } if room_id.as_str() == room
        )
    });
    assert!(told, "{} never heard of room {}", listener, room);
}
