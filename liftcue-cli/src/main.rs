use std::sync::Arc;

use liftcue_capture::{
    BreakoutNavigator, CaptureHosts, DialogPending, EnvironmentHost, FileCaptureHost,
    MicrophoneHost, MicStream, RecognitionEvent, RecognitionHost,
};
use liftcue_core::{
    Action, BlockDraft, BreakoutSession, BreakoutSessionId, CommandError, CommandId, CommandMode,
    ExecutionOutcome, ExecutionStatus, MicPermission, VoiceCommandProposal,
};
use liftcue_engine::engine::{EngineConfig, GestureToken, VoiceCommandEngine};
use liftcue_engine::http::HttpVoiceApi;
use liftcue_engine::traits::{BreakoutBroker, CommandExecutor, CommandParser, TranscriptionService};
use liftcue_providers::ApiConfig;
use tokio::sync::mpsc;

struct TerminalEnvironment;

impl EnvironmentHost for TerminalEnvironment {
    fn is_secure_context(&self) -> bool {
        true
    }
    fn is_embedded_frame(&self) -> bool {
        false
    }
}

/// Plays the command text back as a single finalized recognition segment,
/// standing in for a host speech recognizer.
struct ScriptedRecognition {
    text: String,
}

#[async_trait::async_trait]
impl RecognitionHost for ScriptedRecognition {
    fn is_available(&self) -> bool {
        true
    }

    async fn start(&self) -> Result<mpsc::UnboundedReceiver<RecognitionEvent>, CommandError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(RecognitionEvent::Finalized(self.text.clone()));
        let _ = tx.send(RecognitionEvent::Ended);
        Ok(rx)
    }

    async fn stop(&self) {}
}

struct NoMicrophone;

#[async_trait::async_trait]
impl MicrophoneHost for NoMicrophone {
    fn is_available(&self) -> bool {
        false
    }

    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }

    async fn probe_permission(&self) -> Result<MicPermission, CommandError> {
        Ok(MicPermission::Unknown)
    }

    async fn open(&self, _mime_type: &str) -> Result<Box<dyn MicStream>, CommandError> {
        Err(CommandError::CapabilityUnavailable)
    }
}

struct NoFileDialog;

impl FileCaptureHost for NoFileDialog {
    fn is_available(&self) -> bool {
        false
    }

    fn open_capture_dialog(&self) -> Result<DialogPending, CommandError> {
        Err(CommandError::CapabilityUnavailable)
    }
}

struct PrintlnNavigator;

#[async_trait::async_trait]
impl BreakoutNavigator for PrintlnNavigator {
    async fn open_external(&self, url: &str) -> Result<(), CommandError> {
        println!("[open-external] {url}");
        Ok(())
    }
}

/// Offline parser: enough heuristics to turn demo phrases into a proposal
/// when no backend is configured.
struct ScriptedParser;

#[async_trait::async_trait]
impl CommandParser for ScriptedParser {
    async fn parse(&self, transcript: &str) -> Result<VoiceCommandProposal, CommandError> {
        let lower = transcript.to_lowercase();
        let mode = if lower.contains("i just did") || lower.starts_with("log ") {
            CommandMode::Log
        } else {
            CommandMode::Schedule
        };
        Ok(VoiceCommandProposal {
            command_id: CommandId::new(),
            mode,
            summary_text: transcript.to_string(),
            proposed_action: Action::CreateBlock {
                block: BlockDraft {
                    block_type: "strength".into(),
                    title: transcript.to_string(),
                    datetime_local: "2026-08-30T19:00".into(),
                    duration_minutes: 45,
                    notes: None,
                    payload: None,
                },
            },
            needs_clarification: vec![],
            resolved_datetime: Some("2026-08-30T19:00".into()),
        })
    }
}

struct ScriptedExecutor;

#[async_trait::async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(&self, proposal: &VoiceCommandProposal) -> Result<ExecutionOutcome, CommandError> {
        Ok(ExecutionOutcome {
            status: ExecutionStatus::Succeeded,
            result_summary: format!("{:?}: {}", proposal.mode, proposal.summary_text),
        })
    }
}

/// The scripted session never reaches transcription (streaming hands back
/// text directly) or breakout (a strategy is always available), so the
/// offline stand-ins only need to fail loudly if they are ever hit.
struct OfflineTranscriber;

#[async_trait::async_trait]
impl TranscriptionService for OfflineTranscriber {
    async fn transcribe(&self, _blob: &[u8], _mime_type: &str) -> Result<String, CommandError> {
        Err(CommandError::TranscriptionFailed(
            "no transcription backend configured".into(),
        ))
    }
}

struct OfflineBroker;

#[async_trait::async_trait]
impl BreakoutBroker for OfflineBroker {
    async fn create_session(
        &self,
        _return_url: Option<&str>,
    ) -> Result<BreakoutSession, CommandError> {
        Err(CommandError::CaptureFailed(
            "no breakout backend configured".into(),
        ))
    }

    async fn session_status(
        &self,
        _id: &BreakoutSessionId,
    ) -> Result<BreakoutSession, CommandError> {
        Err(CommandError::CaptureFailed(
            "no breakout backend configured".into(),
        ))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Runs one end-to-end voice session with a scripted recognizer. Pass
    // the command as arguments, or set LIFTCUE_BASE_URL and LIFTCUE_TOKEN
    // to parse and execute against a real backend instead of the offline
    // stand-ins.

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = if args.is_empty() {
        "bench press 3x10 at 80kg tomorrow 7pm".to_string()
    } else {
        args.join(" ")
    };

    let hosts = CaptureHosts {
        environment: Arc::new(TerminalEnvironment),
        recognition: Arc::new(ScriptedRecognition {
            text: command.clone(),
        }),
        microphone: Arc::new(NoMicrophone),
        file_capture: Arc::new(NoFileDialog),
    };

    let base_url = std::env::var("LIFTCUE_BASE_URL").unwrap_or_default();
    let (transcriber, parser, executor, broker): (
        Arc<dyn TranscriptionService>,
        Arc<dyn CommandParser>,
        Arc<dyn CommandExecutor>,
        Arc<dyn BreakoutBroker>,
    ) = if base_url.trim().is_empty() {
        (
            Arc::new(OfflineTranscriber),
            Arc::new(ScriptedParser),
            Arc::new(ScriptedExecutor),
            Arc::new(OfflineBroker),
        )
    } else {
        let token = std::env::var("LIFTCUE_TOKEN").unwrap_or_default();
        let api = Arc::new(HttpVoiceApi::new(ApiConfig::new(base_url, token)));
        (api.clone(), api.clone(), api.clone(), api)
    };

    let engine = VoiceCommandEngine::new(
        EngineConfig::default(),
        hosts,
        Arc::new(PrintlnNavigator),
        transcriber,
        parser,
        executor,
        broker,
    );

    let caps = engine.prepare().await;
    println!("capabilities: recommended strategy = {}", caps.recommended_strategy().label());

    println!("command: {command}");
    let state = engine.start_capture(GestureToken::new()).await?;
    println!("state: {}", state.label());

    let state = engine.stop_capture().await?;
    println!("state: {}", state.label());

    let snapshot = engine.snapshot().await;
    if let Some(proposal) = &snapshot.proposal {
        println!("proposal: {}", proposal.summary_text);
        if let Some(when) = &proposal.resolved_datetime {
            println!("resolved: {when}");
        }
        for question in &proposal.needs_clarification {
            println!("needs clarification: {question}");
        }
    }

    if !snapshot.confirm_enabled {
        println!("cannot confirm; re-run with a more specific command");
        return Ok(());
    }

    let state = engine.confirm().await?;
    println!("state: {}", state.label());
    if let Some(summary) = engine.snapshot().await.result_summary {
        println!("result: {summary}");
    }

    Ok(())
}
