use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Crates whose logs the default filter lets through
const LOG_TARGETS: [&str; 4] = ["runmate", "runmate_cli", "runmate_client", "runmate_core"];

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub default_level: tracing::Level,
    pub show_targets: bool,
    pub show_thread_ids: bool,
    /// Whether to write logs to stderr at all
    pub show_logs: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: tracing::Level::INFO,
            show_targets: true,
            show_thread_ids: false,
            show_logs: true,
        }
    }
}

impl LogConfig {
    /// Development configuration (verbose, human-readable)
    pub fn dev() -> Self {
        Self {
            default_level: tracing::Level::DEBUG,
            show_thread_ids: true,
            ..Default::default()
        }
    }

    /// Only warnings and errors, so notifications stay readable
    pub fn quiet() -> Self {
        Self {
            default_level: tracing::Level::WARN,
            show_targets: false,
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.default_level = level;
        self
    }

    /// Hide logs entirely
    pub fn without_logs(mut self) -> Self {
        self.show_logs = false;
        self
    }

    /// Filter used when `RUST_LOG` is not set
    pub fn default_directives(&self) -> String {
        LOG_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.default_level))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn init(self) -> Result<(), String> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directives()));

        if self.show_logs {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(self.show_targets)
                .with_thread_ids(self.show_thread_ids);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
                .map_err(|e| format!("Failed to initialize tracing: {}", e))
        } else {
            // Silent mode: no fmt layer, just filter
            tracing_subscriber::registry()
                .with(env_filter)
                .try_init()
                .map_err(|e| format!("Failed to initialize tracing: {}", e))
        }
    }
}
