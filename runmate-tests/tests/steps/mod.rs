mod matchmaking_steps;
mod relay_steps;
mod run_steps;
