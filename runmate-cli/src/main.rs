use clap::{Parser, Subcommand};
use runmate_cli::{describe, CliError, ConsoleCommand, LogConfig, Result, HELP};
use runmate_client::{ChannelListener, ClientConfig, SessionHandle, SessionRuntime};
use runmate_core::{Phase, RunParameters, DEFAULT_RELAY_ENDPOINT};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "runmate")]
#[command(version, about = "Runmate - paired-run matchmaking client")]
struct Cli {
    /// Debug-level logs with thread ids
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join matchmaking and drive a paired run from the terminal
    Join {
        /// Relay endpoint, including the matchmaking namespace
        #[arg(short, long, default_value = DEFAULT_RELAY_ENDPOINT)]
        endpoint: String,

        /// Authentication token sent with the join request
        #[arg(short, long)]
        token: String,

        /// Run duration in minutes
        #[arg(short, long, default_value_t = 10)]
        minutes: i64,

        /// Opponent gender filter (0 = any)
        #[arg(short, long, default_value_t = 0)]
        gender: i64,

        /// Seconds before the run starts
        #[arg(long, default_value_t = 0)]
        lead_time: i64,

        /// Seconds to wait for the relay to accept the connection
        #[arg(long, default_value_t = 20)]
        connect_timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::dev()
    } else if cli.quiet {
        LogConfig::quiet()
    } else {
        LogConfig::default()
    };
    log_config.init().map_err(CliError::Logging)?;

    match cli.command {
        Commands::Join {
            endpoint,
            token,
            minutes,
            gender,
            lead_time,
            connect_timeout,
        } => {
            let parameters = RunParameters::from_minutes(minutes, gender, lead_time)
                .map_err(|e| CliError::invalid(e.to_string()))?;
            let config = ClientConfig::new(endpoint)
                .with_connect_timeout(Duration::from_secs(connect_timeout));
            join(config, token, parameters).await?;
        }
    }

    Ok(())
}

async fn join(config: ClientConfig, token: String, parameters: RunParameters) -> Result<()> {
    // Fail on a bad endpoint before anything touches the network
    let endpoint = config.relay_endpoint()?;
    info!(
        "Connecting to relay {} (namespace {})",
        endpoint.socket_addr(),
        endpoint.namespace()
    );

    let mut runtime = SessionRuntime::connect(&config);
    let handle = runtime.handle();
    let (listener, mut notifications) = ChannelListener::new();

    let outcome = handle.join(token, parameters, listener).await?;
    info!("✓ Matchmaking started ({:?})", outcome);
    println!("{}", HELP);

    let result = run_console(&runtime, &handle, &mut notifications).await;

    runtime.shutdown().await;
    info!("Session closed");
    result
}

async fn run_console(
    runtime: &SessionRuntime,
    handle: &SessionHandle,
    notifications: &mut tokio::sync::mpsc::UnboundedReceiver<(
        runmate_core::ResultCode,
        runmate_core::Notification,
    )>,
) -> Result<()> {
    let mut snapshots = runtime.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_phase = snapshots.borrow().phase;

    loop {
        tokio::select! {
            Some((code, notification)) = notifications.recv() => {
                println!("[{}] {}", code, describe(&notification));
            }

            changed = snapshots.changed() => {
                if changed.is_err() {
                    warn!("Session runtime stopped");
                    return Ok(());
                }
                let phase = snapshots.borrow_and_update().phase;
                if phase != last_phase {
                    info!("Phase: {} → {}", last_phase, phase);
                    last_phase = phase;
                }
                if phase == Phase::Closed {
                    println!("Session finished");
                    return Ok(());
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed
                    return Ok(());
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Quit) => return Ok(()),
                    Ok(ConsoleCommand::Help) => println!("{}", HELP),
                    Ok(ConsoleCommand::Status) => {
                        println!("{}", serde_json::to_string_pretty(&runtime.snapshot())?);
                    }
                    Ok(command) => {
                        if let Some(session_command) = command.to_session_command() {
                            match handle.execute(session_command).await {
                                Ok(outcome) => println!("✓ {:?}", outcome),
                                Err(e) => println!("✗ {}", e),
                            }
                        }
                    }
                    Err(e) => println!("✗ {}", e),
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                return Ok(());
            }
        }
    }
}
