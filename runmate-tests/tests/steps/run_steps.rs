use cucumber::{then, when};
use runmate_core::{RunReport, SessionError, Transition};
use runmate_tests::SessionWorld;

// ===== When Steps =====

#[when("I confirm I am ready")]
async fn confirm_ready(world: &mut SessionWorld) {
    let result = world.machine.confirm_ready();
    world.record(result);
}

#[when(expr = "I report {int} km")]
async fn report_progress(world: &mut SessionWorld, km: u32) {
    let result = world.machine.report_progress(km);
    world.record(result);
}

#[when(expr = "I report a stop after {int} meters in {int} seconds")]
async fn report_stop(world: &mut SessionWorld, meters: u32, seconds: u32) {
    let result = world.machine.report_stop(RunReport::new(meters, seconds));
    world.record(result);
}

#[when(expr = "I report a finish after {int} meters in {int} seconds")]
async fn report_finish(world: &mut SessionWorld, meters: u32, seconds: u32) {
    let result = world.machine.report_finish(RunReport::new(meters, seconds));
    world.record(result);
}

#[when("I report the run complete")]
async fn report_complete(world: &mut SessionWorld) {
    let result = world.machine.report_complete();
    world.record(result);
}

// ===== Then Steps =====

#[then("the command succeeds")]
async fn command_succeeds(world: &mut SessionWorld) {
    assert_eq!(world.last_error, None);
}

#[then(expr = "the command is rejected as a protocol violation in {word}")]
async fn command_rejected(world: &mut SessionWorld, phase: String) {
    match &world.last_error {
        Some(SessionError::ProtocolViolation { phase: actual, .. }) => {
            assert_eq!(actual.to_string(), phase);
        }
        other => panic!("Expected a protocol violation, got {:?}", other),
    }
}

#[then("the event is ignored")]
async fn event_ignored(world: &mut SessionWorld) {
    assert!(matches!(
        world.last_transition,
        Some(Transition::Ignored | Transition::Dropped)
    ));
}

#[then("the event is rejected")]
async fn event_rejected(world: &mut SessionWorld) {
    assert_eq!(world.last_transition, Some(Transition::Rejected));
}
