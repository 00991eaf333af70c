use std::sync::Arc;
use std::time::Duration;

use liftcue_capture::{
    BreakoutNavigator, CaptureHosts, CaptureStrategy, CapabilityDetector, Fallback,
    FallbackPlanner, ProbeConfig, build_strategy,
};
use liftcue_core::{CaptureCapabilities, CaptureResult, CommandError, ExecutionStatus, StrategyKind};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::session::{SessionSnapshot, SessionState};
use crate::traits::{BreakoutBroker, CommandExecutor, CommandParser, TranscriptionService};

/// Caller-misuse errors. Pipeline failures never come back through these;
/// they land in the session's `Error` state with a `CommandError` attached.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no proposal is awaiting confirmation")]
    NotConfirming,

    #[error("the proposal still needs clarification")]
    ClarificationPending,

    #[error("no capture is active")]
    NoActiveCapture,

    #[error("manual entry is only reachable from idle or error")]
    TextInputUnavailable,

    /// The operation belonged to an attempt that was dismissed or replaced
    /// while it was in flight. Its result was discarded.
    #[error("superseded by a newer attempt")]
    Superseded,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub probe: ProbeConfig,
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
    /// Where the breakout page should send the user back to, if the host
    /// app supports return navigation.
    pub return_url: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            probe: ProbeConfig::default(),
            poll_interval: Duration::from_secs(2),
            poll_max_attempts: 60,
            return_url: None,
        }
    }
}

/// Marker for the synchronous call-stack window of a user tap. Minted by
/// the host shell once per tap and consumed by exactly one `start_capture`
/// call; it exists to keep "capture starts inside a gesture" visible in the
/// signature rather than in a comment at the call site.
pub struct GestureToken(());

impl GestureToken {
    pub fn new() -> Self {
        Self(())
    }
}

pub(crate) struct Flow {
    /// Attempt generation. Captured before every await and re-checked
    /// after, so a result arriving for a dismissed or replaced attempt is
    /// dropped instead of applied.
    pub(crate) attempt: u64,
    pub(crate) state: SessionState,
    pub(crate) caps: Option<CaptureCapabilities>,
    pub(crate) active: Option<Box<dyn CaptureStrategy>>,
    pub(crate) proposal: Option<liftcue_core::VoiceCommandProposal>,
    pub(crate) error: Option<CommandError>,
    pub(crate) offer_text_input: bool,
    pub(crate) result_summary: Option<String>,
}

/// The voice session orchestrator. One logical attempt at a time; starting
/// a new one cancels whatever the previous one still had in flight.
///
/// The interior lock is never held across a capture or service await.
pub struct VoiceCommandEngine {
    pub(crate) cfg: EngineConfig,
    hosts: CaptureHosts,
    pub(crate) navigator: Arc<dyn BreakoutNavigator>,
    transcriber: Arc<dyn TranscriptionService>,
    parser: Arc<dyn CommandParser>,
    executor: Arc<dyn CommandExecutor>,
    pub(crate) broker: Arc<dyn BreakoutBroker>,
    pub(crate) inner: Mutex<Flow>,
}

impl VoiceCommandEngine {
    pub fn new(
        cfg: EngineConfig,
        hosts: CaptureHosts,
        navigator: Arc<dyn BreakoutNavigator>,
        transcriber: Arc<dyn TranscriptionService>,
        parser: Arc<dyn CommandParser>,
        executor: Arc<dyn CommandExecutor>,
        broker: Arc<dyn BreakoutBroker>,
    ) -> Self {
        Self {
            cfg,
            hosts,
            navigator,
            transcriber,
            parser,
            executor,
            broker,
            inner: Mutex::new(Flow {
                attempt: 0,
                state: SessionState::Idle,
                caps: None,
                active: None,
                proposal: None,
                error: None,
                offer_text_input: false,
                result_summary: None,
            }),
        }
    }

    /// Probes the host and caches a capability snapshot for the next
    /// attempt. Runs before the user gesture so that `start_capture` can
    /// pick its strategy without consuming the gesture on a probe. The
    /// snapshot is consumed by one attempt; call again before the next.
    pub async fn prepare(&self) -> CaptureCapabilities {
        let detector = CapabilityDetector::new(self.hosts.clone(), self.cfg.probe.clone());
        let caps = detector.detect().await;
        log::debug!("capability snapshot: {caps:?}");
        self.inner.lock().await.caps = Some(caps.clone());
        caps
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let flow = self.inner.lock().await;
        SessionSnapshot {
            state: flow.state,
            state_label: flow.state.label().to_string(),
            proposal: flow.proposal.clone(),
            confirm_enabled: flow.state == SessionState::Confirming
                && flow.proposal.as_ref().is_some_and(|p| p.can_confirm()),
            error_kind: flow.error.as_ref().map(|e| e.kind().to_string()),
            error_message: flow.error.as_ref().map(|e| e.to_string()),
            offer_text_input: flow.offer_text_input,
            result_summary: flow.result_summary.clone(),
        }
    }

    /// Abort everything and return to idle: stop any active strategy,
    /// release the microphone, and invalidate in-flight work (polls and
    /// pending service calls see the bumped generation and drop their
    /// results).
    pub async fn dismiss(&self) {
        let active = {
            let mut flow = self.inner.lock().await;
            flow.attempt += 1;
            flow.state = SessionState::Idle;
            flow.proposal = None;
            flow.error = None;
            flow.offer_text_input = false;
            flow.result_summary = None;
            flow.active.take()
        };
        if let Some(mut strategy) = active {
            strategy.abort().await;
        }
    }

    /// Begin capture with the strategy recommended by the cached capability
    /// snapshot. Recording strategies leave the session in `Recording`
    /// until `stop_capture`; the file dialog and breakout drive all the way
    /// to `Confirming` (or `Error`) before returning.
    pub async fn start_capture(
        &self,
        _gesture: GestureToken,
    ) -> Result<SessionState, EngineError> {
        self.dismiss().await;

        let (attempt, caps) = {
            let mut flow = self.inner.lock().await;
            let caps = flow
                .caps
                .take()
                .unwrap_or_else(CaptureCapabilities::conservative);
            (flow.attempt, caps)
        };

        let mut planner = FallbackPlanner::new();
        let mut kind = caps.recommended_strategy();

        loop {
            if kind == StrategyKind::Breakout {
                return self.run_breakout(attempt).await;
            }

            let Some(mut strategy) = build_strategy(kind, &self.hosts) else {
                return self
                    .fail(attempt, CommandError::CapabilityUnavailable)
                    .await;
            };

            log::info!("starting capture via {}", kind.label());
            match strategy.start().await {
                Ok(()) => {
                    let started_state = match kind {
                        StrategyKind::FileCapture => SessionState::FileCapture,
                        _ => SessionState::Recording,
                    };
                    {
                        let mut flow = self.inner.lock().await;
                        if flow.attempt == attempt {
                            flow.state = started_state;
                            flow.active = Some(strategy);
                            drop(flow);
                            return if kind == StrategyKind::FileCapture {
                                self.complete_capture(attempt).await
                            } else {
                                Ok(started_state)
                            };
                        }
                    }
                    strategy.abort().await;
                    return Err(EngineError::Superseded);
                }
                Err(err) => {
                    strategy.abort().await;
                    log::info!("{} failed to start: {} ({})", kind.label(), err, err.kind());
                    match planner.next(kind, &err, &caps) {
                        Fallback::Try(next) => kind = next,
                        Fallback::ReturnToIdle => {
                            let mut flow = self.inner.lock().await;
                            if flow.attempt == attempt {
                                flow.state = SessionState::Idle;
                            }
                            return Ok(SessionState::Idle);
                        }
                        Fallback::Surface => return self.fail(attempt, err).await,
                    }
                }
            }
        }
    }

    /// User stopped a recording strategy. Finishes capture and drives the
    /// session through transcription and parsing to `Confirming`.
    pub async fn stop_capture(&self) -> Result<SessionState, EngineError> {
        let attempt = {
            let flow = self.inner.lock().await;
            if flow.state != SessionState::Recording || flow.active.is_none() {
                return Err(EngineError::NoActiveCapture);
            }
            flow.attempt
        };
        self.complete_capture(attempt).await
    }

    pub(crate) async fn complete_capture(&self, attempt: u64) -> Result<SessionState, EngineError> {
        let mut strategy = {
            let mut flow = self.inner.lock().await;
            if flow.attempt != attempt {
                return Err(EngineError::Superseded);
            }
            flow.active.take().ok_or(EngineError::NoActiveCapture)?
        };

        let result = strategy.finish().await;

        {
            let flow = self.inner.lock().await;
            if flow.attempt != attempt {
                drop(flow);
                // The session moved on while capture was resolving; make
                // sure no device stays held, and drop the late result.
                strategy.abort().await;
                return Err(EngineError::Superseded);
            }
        }

        match result {
            // Direct transcript: skip server transcription entirely.
            Ok(CaptureResult::Transcript(text)) => self.parse_text(attempt, text).await,
            Ok(CaptureResult::Audio {
                blob, mime_type, ..
            }) => self.transcribe_audio(attempt, blob, mime_type).await,
            Err(err) if err.is_user_cancelled() => {
                // Backing out of a native dialog is not a failure.
                let mut flow = self.inner.lock().await;
                if flow.attempt == attempt {
                    flow.state = SessionState::Idle;
                }
                Ok(SessionState::Idle)
            }
            Err(err) => self.fail(attempt, err).await,
        }
    }

    async fn transcribe_audio(
        &self,
        attempt: u64,
        blob: Vec<u8>,
        mime_type: String,
    ) -> Result<SessionState, EngineError> {
        self.enter(attempt, SessionState::Transcribing).await?;

        match self.transcriber.transcribe(&blob, &mime_type).await {
            Ok(text) if !text.trim().is_empty() => self.parse_text(attempt, text).await,
            Ok(_) => {
                self.fail(
                    attempt,
                    CommandError::TranscriptionFailed("service returned empty text".into()),
                )
                .await
            }
            Err(err) => self.fail(attempt, err).await,
        }
    }

    pub(crate) async fn parse_text(
        &self,
        attempt: u64,
        text: String,
    ) -> Result<SessionState, EngineError> {
        self.enter(attempt, SessionState::Parsing).await?;

        match self.parser.parse(text.trim()).await {
            Ok(proposal) => {
                let mut flow = self.inner.lock().await;
                if flow.attempt != attempt {
                    return Err(EngineError::Superseded);
                }
                if !proposal.can_confirm() {
                    log::info!(
                        "proposal needs clarification: {:?}",
                        proposal.needs_clarification
                    );
                }
                flow.proposal = Some(proposal);
                flow.state = SessionState::Confirming;
                Ok(SessionState::Confirming)
            }
            Err(err) => self.fail(attempt, err).await,
        }
    }

    /// Manual fallback: typed text is treated identically to a transcribed
    /// result, bypassing capture and transcription.
    pub async fn submit_text(&self, text: &str) -> Result<SessionState, EngineError> {
        self.dismiss().await;

        let attempt = {
            let mut flow = self.inner.lock().await;
            flow.state = SessionState::TextInput;
            flow.attempt
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return self
                .fail(attempt, CommandError::ParsingFailed("empty command text".into()))
                .await;
        }
        self.parse_text(attempt, trimmed.to_string()).await
    }

    /// Route into manual entry, from idle or from a surfaced error.
    pub async fn enter_text_input(&self) -> Result<SessionState, EngineError> {
        let mut flow = self.inner.lock().await;
        if !matches!(flow.state, SessionState::Idle | SessionState::Error) {
            return Err(EngineError::TextInputUnavailable);
        }
        flow.state = SessionState::TextInput;
        flow.error = None;
        flow.proposal = None;
        Ok(SessionState::TextInput)
    }

    /// Execute the live proposal. Refuses while clarification is pending.
    /// On any execution failure the proposal is treated as stale: the
    /// underlying state may have partially changed, so the user re-enters
    /// the command instead of re-confirming.
    pub async fn confirm(&self) -> Result<SessionState, EngineError> {
        let (attempt, proposal) = {
            let mut flow = self.inner.lock().await;
            if flow.state != SessionState::Confirming {
                return Err(EngineError::NotConfirming);
            }
            let proposal = flow.proposal.clone().ok_or(EngineError::NotConfirming)?;
            if !proposal.can_confirm() {
                return Err(EngineError::ClarificationPending);
            }
            flow.state = SessionState::Executing;
            (flow.attempt, proposal)
        };

        let outcome = self.executor.execute(&proposal).await;

        let mut flow = self.inner.lock().await;
        if flow.attempt != attempt {
            return Err(EngineError::Superseded);
        }
        match outcome {
            Ok(outcome) if outcome.status == ExecutionStatus::Succeeded => {
                log::info!("voice command executed: {}", outcome.result_summary);
                flow.state = SessionState::Success;
                flow.result_summary = Some(outcome.result_summary);
                Ok(SessionState::Success)
            }
            Ok(outcome) => {
                flow.state = SessionState::Error;
                flow.error = Some(CommandError::ExecutionFailed(outcome.result_summary));
                flow.proposal = None;
                flow.offer_text_input = false;
                Ok(SessionState::Error)
            }
            Err(err) => {
                flow.state = SessionState::Error;
                flow.error = Some(err);
                flow.proposal = None;
                flow.offer_text_input = false;
                Ok(SessionState::Error)
            }
        }
    }

    pub(crate) async fn enter(
        &self,
        attempt: u64,
        state: SessionState,
    ) -> Result<(), EngineError> {
        let mut flow = self.inner.lock().await;
        if flow.attempt != attempt {
            return Err(EngineError::Superseded);
        }
        flow.state = state;
        Ok(())
    }

    pub(crate) async fn fail(
        &self,
        attempt: u64,
        err: CommandError,
    ) -> Result<SessionState, EngineError> {
        let mut flow = self.inner.lock().await;
        if flow.attempt != attempt {
            return Err(EngineError::Superseded);
        }
        log::warn!("voice command failed: {err} ({})", err.kind());
        flow.offer_text_input = err.is_capture_class();
        flow.error = Some(err);
        flow.proposal = None;
        flow.state = SessionState::Error;
        Ok(SessionState::Error)
    }
}
