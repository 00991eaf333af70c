use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MicPermission {
    Granted,
    Denied,
    Prompt,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    StreamingRecognition,
    LocalRecorder,
    FileCapture,
    Breakout,
}

impl StrategyKind {
    pub fn label(self) -> &'static str {
        match self {
            StrategyKind::StreamingRecognition => "streaming_recognition",
            StrategyKind::LocalRecorder => "local_recorder",
            StrategyKind::FileCapture => "file_capture",
            StrategyKind::Breakout => "breakout",
        }
    }
}

/// One-per-attempt snapshot of what the host environment can actually do.
///
/// Never branch on host identity strings anywhere downstream; every quirk a
/// host exhibits must land in one of these flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureCapabilities {
    pub has_streaming_speech_recognition: bool,
    pub has_local_recorder: bool,
    pub has_file_capture_dialog: bool,
    pub is_secure_context: bool,
    pub is_embedded_frame: bool,
    pub microphone_permission: MicPermission,
    /// Set when the permission probe was rejected fast enough to indicate a
    /// container/frame policy block rather than a user decline. Forces the
    /// microphone-based strategies off for this attempt.
    pub policy_blocked: bool,
    pub recorder_mime_types: Vec<String>,
}

impl CaptureCapabilities {
    /// The snapshot used when probing itself fails: assume only the file
    /// capture dialog works.
    pub fn conservative() -> Self {
        Self {
            has_streaming_speech_recognition: false,
            has_local_recorder: false,
            has_file_capture_dialog: true,
            is_secure_context: false,
            is_embedded_frame: false,
            microphone_permission: MicPermission::Unknown,
            policy_blocked: false,
            recorder_mime_types: Vec::new(),
        }
    }

    fn microphone_usable(&self) -> bool {
        self.is_secure_context
            && !self.policy_blocked
            && self.microphone_permission != MicPermission::Denied
    }

    pub fn allows(&self, kind: StrategyKind) -> bool {
        match kind {
            StrategyKind::StreamingRecognition => {
                self.has_streaming_speech_recognition && self.microphone_usable()
            }
            StrategyKind::LocalRecorder => self.has_local_recorder && self.microphone_usable(),
            StrategyKind::FileCapture => self.has_file_capture_dialog,
            // Always available as the last resort.
            StrategyKind::Breakout => true,
        }
    }

    /// Preference order: streaming recognition, local recorder, file
    /// capture, breakout. Decided before the user gesture is consumed and
    /// never re-decided mid-flight.
    pub fn recommended_strategy(&self) -> StrategyKind {
        for kind in [
            StrategyKind::StreamingRecognition,
            StrategyKind::LocalRecorder,
            StrategyKind::FileCapture,
        ] {
            if self.allows(kind) {
                return kind;
            }
        }
        StrategyKind::Breakout
    }
}
