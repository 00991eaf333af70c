use async_trait::async_trait;
use liftcue_core::{
    BreakoutSession, BreakoutSessionId, CommandError, ExecutionOutcome, VoiceCommandProposal,
};

/// Turns a captured audio payload into text. Empty text is the service's
/// failure, not a valid result.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    async fn transcribe(&self, blob: &[u8], mime_type: &str) -> Result<String, CommandError>;
}

/// Turns transcript text into a structured proposal.
#[async_trait]
pub trait CommandParser: Send + Sync {
    async fn parse(&self, transcript: &str) -> Result<VoiceCommandProposal, CommandError>;
}

/// Applies an approved proposal. Receives the full proposal so the mutation
/// is exactly what the user confirmed; `command_id` makes retries safe.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, proposal: &VoiceCommandProposal) -> Result<ExecutionOutcome, CommandError>;
}

/// The capture-session broker behind the breakout protocol. The client
/// creates a session and reads its status; it never writes status.
#[async_trait]
pub trait BreakoutBroker: Send + Sync {
    async fn create_session(
        &self,
        return_url: Option<&str>,
    ) -> Result<BreakoutSession, CommandError>;

    async fn session_status(
        &self,
        id: &BreakoutSessionId,
    ) -> Result<BreakoutSession, CommandError>;
}
