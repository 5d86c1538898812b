use crate::domain::{Credential, RunParameters, RunReport};

/// Requests an external caller can make of the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Open the relay link without joining
    Open,

    /// Start matchmaking (or rebind the listener if already matching)
    Join {
        credential: Credential,
        parameters: RunParameters,
    },

    /// Ask the relay to stop matchmaking
    Cancel,

    ConfirmReady,

    /// Another kilometre covered
    ReportProgress { km: u32 },

    /// Early termination
    ReportStop(RunReport),

    ReportFinish(RunReport),

    ReportComplete,

    /// Release subscriptions and disconnect
    Shutdown,
}

impl SessionCommand {
    /// Short name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::Open => "open",
            SessionCommand::Join { .. } => "join",
            SessionCommand::Cancel => "cancel",
            SessionCommand::ConfirmReady => "confirmReady",
            SessionCommand::ReportProgress { .. } => "reportProgress",
            SessionCommand::ReportStop(_) => "reportStop",
            SessionCommand::ReportFinish(_) => "reportFinish",
            SessionCommand::ReportComplete => "reportComplete",
            SessionCommand::Shutdown => "shutdown",
        }
    }
}
