use std::sync::Arc;

use async_trait::async_trait;
use liftcue_core::{CaptureResult, CommandError, StrategyKind};

use crate::host::{MicStream, MicrophoneHost};
use crate::strategy::CaptureStrategy;

/// Container formats we know how to ship to the transcription service, in
/// descending preference.
pub const MIME_PREFERENCE: [&str; 4] = [
    "audio/webm;codecs=opus",
    "audio/webm",
    "audio/mp4",
    "audio/ogg",
];

/// Strategy 2: record with the host's local recorder, upload for server
/// transcription. Holds the device only between `start` and
/// `finish`/`abort`; every exit path releases it.
pub struct LocalRecorderStrategy {
    host: Arc<dyn MicrophoneHost>,
    stream: Option<Box<dyn MicStream>>,
}

impl LocalRecorderStrategy {
    pub fn new(host: Arc<dyn MicrophoneHost>) -> Self {
        Self { host, stream: None }
    }
}

pub fn pick_mime_type(supported: &[String]) -> Option<&'static str> {
    MIME_PREFERENCE
        .iter()
        .copied()
        .find(|preferred| supported.iter().any(|s| s == preferred))
}

#[async_trait]
impl CaptureStrategy for LocalRecorderStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LocalRecorder
    }

    async fn start(&mut self) -> Result<(), CommandError> {
        let supported = self.host.supported_mime_types();
        let mime_type =
            pick_mime_type(&supported).ok_or(CommandError::CapabilityUnavailable)?;
        log::debug!("recording into {mime_type}");
        self.stream = Some(self.host.open(mime_type).await?);
        Ok(())
    }

    async fn finish(&mut self) -> Result<CaptureResult, CommandError> {
        let Some(stream) = self.stream.take() else {
            return Err(CommandError::CaptureFailed(
                "recorder was never started".into(),
            ));
        };

        // MicStream::stop releases the device on both outcomes.
        let audio = stream.stop().await?;
        CaptureResult::audio(audio.blob, audio.mime_type, audio.duration_hint)
    }

    async fn abort(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.release().await;
        }
    }
}
