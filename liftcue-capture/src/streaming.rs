use std::sync::Arc;

use async_trait::async_trait;
use liftcue_core::{CaptureResult, CommandError, StrategyKind};
use tokio::sync::mpsc;

use crate::host::{RecognitionEvent, RecognitionHost};
use crate::strategy::CaptureStrategy;

/// Strategy 1: continuous speech recognition in the host.
///
/// Accumulates only finalized segments; interim hypotheses would duplicate
/// text and are dropped on the floor. Returns a transcript directly, so the
/// session skips server transcription entirely.
pub struct StreamingRecognitionStrategy {
    host: Arc<dyn RecognitionHost>,
    events: Option<mpsc::UnboundedReceiver<RecognitionEvent>>,
}

impl StreamingRecognitionStrategy {
    pub fn new(host: Arc<dyn RecognitionHost>) -> Self {
        Self { host, events: None }
    }
}

#[async_trait]
impl CaptureStrategy for StreamingRecognitionStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StreamingRecognition
    }

    async fn start(&mut self) -> Result<(), CommandError> {
        self.events = Some(self.host.start().await?);
        Ok(())
    }

    async fn finish(&mut self) -> Result<CaptureResult, CommandError> {
        let Some(mut events) = self.events.take() else {
            return Err(CommandError::CaptureFailed(
                "recognition was never started".into(),
            ));
        };

        self.host.stop().await;

        let mut segments: Vec<String> = Vec::new();
        while let Some(event) = events.recv().await {
            match event {
                RecognitionEvent::Finalized(text) => {
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        segments.push(text);
                    }
                }
                RecognitionEvent::Interim(_) => {}
                // Silence mid-session is fine; only an empty total matters.
                RecognitionEvent::NoSpeech => {}
                RecognitionEvent::Failed { message, permission } => {
                    return Err(if permission {
                        CommandError::PermissionDenied { policy: false }
                    } else {
                        CommandError::CaptureFailed(message)
                    });
                }
                RecognitionEvent::Ended => break,
            }
        }

        if segments.is_empty() {
            return Err(CommandError::NoAudioCaptured);
        }
        CaptureResult::transcript(segments.join(" "))
    }

    async fn abort(&mut self) {
        if self.events.take().is_some() {
            self.host.stop().await;
        }
    }
}
