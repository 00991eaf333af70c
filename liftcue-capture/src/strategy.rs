use async_trait::async_trait;
use liftcue_core::{CaptureResult, CommandError, StrategyKind};

use crate::file_dialog::FileCaptureStrategy;
use crate::host::CaptureHosts;
use crate::recorder::LocalRecorderStrategy;
use crate::streaming::StreamingRecognitionStrategy;

/// Uniform contract over the three in-page capture mechanisms.
///
/// `start` must make its first host call before any await so that
/// dialog-based strategies land inside the user's gesture window. `finish`
/// produces exactly one `CaptureResult` or a typed failure; partial state
/// (interim recognition hypotheses, raw device buffers) never leaves the
/// strategy. `abort` is idempotent and releases any held device.
#[async_trait]
pub trait CaptureStrategy: Send {
    fn kind(&self) -> StrategyKind;

    async fn start(&mut self) -> Result<(), CommandError>;

    async fn finish(&mut self) -> Result<CaptureResult, CommandError>;

    async fn abort(&mut self);
}

/// Builds the strategy for `kind`. Breakout is not an in-page strategy and
/// has no entry here; the engine routes it through the handoff protocol.
pub fn build_strategy(kind: StrategyKind, hosts: &CaptureHosts) -> Option<Box<dyn CaptureStrategy>> {
    match kind {
        StrategyKind::StreamingRecognition => Some(Box::new(StreamingRecognitionStrategy::new(
            hosts.recognition.clone(),
        ))),
        StrategyKind::LocalRecorder => Some(Box::new(LocalRecorderStrategy::new(
            hosts.microphone.clone(),
        ))),
        StrategyKind::FileCapture => Some(Box::new(FileCaptureStrategy::new(
            hosts.file_capture.clone(),
        ))),
        StrategyKind::Breakout => None,
    }
}
