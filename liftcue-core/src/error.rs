use thiserror::Error;

/// Everything that can go wrong between "user tapped the mic button" and
/// "the approved action was applied".
///
/// The variants are deliberately coarse: the UI routes on `kind()`, and the
/// fallback logic routes on the classification helpers below.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("microphone permission denied (policy: {policy})")]
    PermissionDenied {
        /// True when the denial came from the embedding container/frame
        /// rather than the user declining a prompt.
        policy: bool,
    },

    #[error("no usable capture capability in this environment")]
    CapabilityUnavailable,

    #[error("no audio was captured")]
    NoAudioCaptured,

    #[error("capture cancelled by the user")]
    UserCancelled,

    /// Unknown/technical capture failure. Distinct from the capability
    /// class: it escalates to the next strategy at most once.
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("command parsing failed: {0}")]
    ParsingFailed(String),

    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    #[error("breakout session expired")]
    SessionExpired,
}

impl CommandError {
    /// Stable label for UI routing and logs. Intentionally not derived from
    /// `Debug`.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::PermissionDenied { .. } => "permission_denied",
            CommandError::CapabilityUnavailable => "capability_unavailable",
            CommandError::NoAudioCaptured => "no_audio_captured",
            CommandError::UserCancelled => "user_cancelled",
            CommandError::CaptureFailed(_) => "capture_failed",
            CommandError::TranscriptionFailed(_) => "transcription_failed",
            CommandError::ParsingFailed(_) => "parsing_failed",
            CommandError::ExecutionFailed(_) => "execution_failed",
            CommandError::SessionExpired => "session_expired",
        }
    }

    /// Capability-class failures cascade to the next capture strategy
    /// without surfacing anything to the user.
    pub fn is_capability_class(&self) -> bool {
        matches!(
            self,
            CommandError::PermissionDenied { .. } | CommandError::CapabilityUnavailable
        )
    }

    pub fn is_user_cancelled(&self) -> bool {
        matches!(self, CommandError::UserCancelled)
    }

    /// Failures of the capture phase itself. When one of these surfaces, the
    /// UI offers manual text entry instead of a dead end.
    pub fn is_capture_class(&self) -> bool {
        matches!(
            self,
            CommandError::PermissionDenied { .. }
                | CommandError::CapabilityUnavailable
                | CommandError::NoAudioCaptured
                | CommandError::UserCancelled
                | CommandError::CaptureFailed(_)
                | CommandError::SessionExpired
        )
    }
}
