//
// HTTP-backed implementations of the service traits, over the
// liftcue-providers wire contracts. One `HttpVoiceApi` serves all four
// seams; tests swap in fakes per trait instead.

use async_trait::async_trait;
use liftcue_core::{
    BreakoutSession, BreakoutSessionId, CommandError, ExecutionOutcome, VoiceCommandProposal,
};
use liftcue_providers::{ApiConfig, broker, execution, parsing, runtime, transcription};

use crate::traits::{BreakoutBroker, CommandExecutor, CommandParser, TranscriptionService};

#[derive(Debug, Clone)]
pub struct HttpVoiceApi {
    cfg: ApiConfig,
}

impl HttpVoiceApi {
    pub fn new(cfg: ApiConfig) -> Self {
        Self { cfg }
    }
}

#[async_trait]
impl TranscriptionService for HttpVoiceApi {
    async fn transcribe(&self, blob: &[u8], mime_type: &str) -> Result<String, CommandError> {
        let req = transcription::build_transcribe_request(&self.cfg, blob, mime_type);
        let resp = runtime::execute(&req)
            .await
            .map_err(|e| CommandError::TranscriptionFailed(e.to_string()))?;
        if !resp.is_success() {
            return Err(CommandError::TranscriptionFailed(format!(
                "transcription endpoint returned status {}",
                resp.status
            )));
        }
        transcription::parse_transcribe_response(&resp.body)
            .map_err(|e| CommandError::TranscriptionFailed(e.to_string()))
    }
}

#[async_trait]
impl CommandParser for HttpVoiceApi {
    async fn parse(&self, transcript: &str) -> Result<VoiceCommandProposal, CommandError> {
        let req = parsing::build_parse_request(&self.cfg, transcript);
        let resp = runtime::execute(&req)
            .await
            .map_err(|e| CommandError::ParsingFailed(e.to_string()))?;
        if !resp.is_success() {
            return Err(CommandError::ParsingFailed(format!(
                "parse endpoint returned status {}",
                resp.status
            )));
        }
        parsing::parse_proposal_response(&resp.body)
            .map_err(|e| CommandError::ParsingFailed(e.to_string()))
    }
}

#[async_trait]
impl CommandExecutor for HttpVoiceApi {
    async fn execute(
        &self,
        proposal: &VoiceCommandProposal,
    ) -> Result<ExecutionOutcome, CommandError> {
        let req = execution::build_execute_request(&self.cfg, proposal);
        let resp = runtime::execute(&req)
            .await
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;
        if !resp.is_success() {
            return Err(CommandError::ExecutionFailed(format!(
                "execute endpoint returned status {}",
                resp.status
            )));
        }
        execution::parse_execute_response(&resp.body)
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))
    }
}

#[async_trait]
impl BreakoutBroker for HttpVoiceApi {
    async fn create_session(
        &self,
        return_url: Option<&str>,
    ) -> Result<BreakoutSession, CommandError> {
        let req = broker::build_create_session_request(&self.cfg, return_url);
        let resp = runtime::execute(&req)
            .await
            .map_err(|e| CommandError::CaptureFailed(format!("breakout broker: {e}")))?;
        if !resp.is_success() {
            return Err(CommandError::CaptureFailed(format!(
                "breakout broker returned status {}",
                resp.status
            )));
        }
        broker::parse_session_response(&resp.body)
            .map_err(|e| CommandError::CaptureFailed(format!("breakout broker: {e}")))
    }

    async fn session_status(
        &self,
        id: &BreakoutSessionId,
    ) -> Result<BreakoutSession, CommandError> {
        let req = broker::build_session_status_request(&self.cfg, id);
        let resp = runtime::execute(&req)
            .await
            .map_err(|e| CommandError::CaptureFailed(format!("breakout broker: {e}")))?;
        if resp.status == 404 {
            // The record is gone; the bounded lifetime has passed.
            return Err(CommandError::SessionExpired);
        }
        if !resp.is_success() {
            return Err(CommandError::CaptureFailed(format!(
                "breakout broker returned status {}",
                resp.status
            )));
        }
        broker::parse_session_response(&resp.body)
            .map_err(|e| CommandError::CaptureFailed(format!("breakout broker: {e}")))
    }
}
