//
// Host environment seams.
//
// Everything platform-flavored about audio capture lives behind these
// traits: the real adapters wrap whatever the host actually exposes, and
// tests inject fakes. Strategies and the detector only ever see these
// contracts, never a host identity.

use std::sync::Arc;

use async_trait::async_trait;
use liftcue_core::{CommandError, MicPermission};
use tokio::sync::{mpsc, oneshot};

/// Static facts about the page's execution context.
pub trait EnvironmentHost: Send + Sync {
    /// Capture APIs are refused outright in insecure contexts.
    fn is_secure_context(&self) -> bool;

    /// Embedding often blocks microphone permission policies even when the
    /// API objects exist.
    fn is_embedded_frame(&self) -> bool;
}

/// Events from a host streaming-recognition session.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// A finalized segment. Only these contribute to the transcript.
    Finalized(String),
    /// A partial hypothesis. Delivered by some hosts; always discarded.
    Interim(String),
    /// Nothing heard for a while. Not fatal while listening continues.
    NoSpeech,
    /// Recognizer failure. `permission` marks mic-permission denials.
    Failed { message: String, permission: bool },
    /// The recognition session ended; no further events follow.
    Ended,
}

#[async_trait]
pub trait RecognitionHost: Send + Sync {
    fn is_available(&self) -> bool;

    /// Start a continuous recognition session. Events arrive on the
    /// returned channel until `Ended`.
    async fn start(&self) -> Result<mpsc::UnboundedReceiver<RecognitionEvent>, CommandError>;

    /// Stop listening. The active session must emit `Ended` afterwards.
    async fn stop(&self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAudio {
    pub blob: Vec<u8>,
    pub mime_type: String,
    pub duration_hint: Option<f64>,
}

/// An open microphone recording. Whoever holds one owns the device and must
/// end it through exactly one of `stop` or `release`.
#[async_trait]
pub trait MicStream: Send {
    /// Stop recording, release the device, and hand back the capture.
    async fn stop(self: Box<Self>) -> Result<RecordedAudio, CommandError>;

    /// Release the device and discard whatever was captured.
    async fn release(self: Box<Self>);
}

#[async_trait]
pub trait MicrophoneHost: Send + Sync {
    fn is_available(&self) -> bool;

    /// Container formats the host recorder can produce, host order.
    fn supported_mime_types(&self) -> Vec<String>;

    /// Lightweight permission check. Must not hold the device open. A
    /// rejection carries the denial as the error; the caller times it to
    /// distinguish policy blocks from user declines.
    async fn probe_permission(&self) -> Result<MicPermission, CommandError>;

    /// Open the device recording into `mime_type`.
    async fn open(&self, mime_type: &str) -> Result<Box<dyn MicStream>, CommandError>;
}

/// Handle to a capture dialog that is already open. Constructed by the host
/// inside `open_capture_dialog`, resolved once the user finishes.
pub struct DialogPending {
    rx: oneshot::Receiver<Result<Option<RecordedAudio>, CommandError>>,
}

impl DialogPending {
    pub fn new(rx: oneshot::Receiver<Result<Option<RecordedAudio>, CommandError>>) -> Self {
        Self { rx }
    }

    /// `Ok(None)` means the user dismissed the chooser.
    pub async fn resolve(self) -> Result<Option<RecordedAudio>, CommandError> {
        match self.rx.await {
            Ok(outcome) => outcome,
            // Host dropped the sender without answering.
            Err(_) => Err(CommandError::CaptureFailed(
                "capture dialog was abandoned by the host".into(),
            )),
        }
    }
}

pub trait FileCaptureHost: Send + Sync {
    fn is_available(&self) -> bool;

    /// Open the native audio-capture chooser. This is deliberately a
    /// synchronous call: it must run inside the user's gesture window, with
    /// no asynchronous work in front of it, or mobile hosts silently refuse
    /// to show the dialog.
    fn open_capture_dialog(&self) -> Result<DialogPending, CommandError>;
}

/// Opens the breakout capture page in a separate, unembedded browsing
/// context.
#[async_trait]
pub trait BreakoutNavigator: Send + Sync {
    async fn open_external(&self, url: &str) -> Result<(), CommandError>;
}

/// The full host surface, bundled for wiring.
#[derive(Clone)]
pub struct CaptureHosts {
    pub environment: Arc<dyn EnvironmentHost>,
    pub recognition: Arc<dyn RecognitionHost>,
    pub microphone: Arc<dyn MicrophoneHost>,
    pub file_capture: Arc<dyn FileCaptureHost>,
}
