use liftcue_core::VoiceCommandProposal;
use serde::{Deserialize, Serialize};

/// Lifecycle of one voice-command attempt.
///
/// `Success` is the only terminal state; `Error` is recoverable by retrying
/// from idle, and `TextInput` is the manual fallback reachable from idle or
/// from an error once capture is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Recording,
    FileCapture,
    Breakout,
    Transcribing,
    Parsing,
    Confirming,
    Executing,
    Success,
    TextInput,
    Error,
}

impl SessionState {
    /// Stable label for UI display and logs; not derived from `Debug`.
    pub fn label(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::FileCapture => "file_capture",
            SessionState::Breakout => "breakout",
            SessionState::Transcribing => "transcribing",
            SessionState::Parsing => "parsing",
            SessionState::Confirming => "confirming",
            SessionState::Executing => "executing",
            SessionState::Success => "success",
            SessionState::TextInput => "text_input",
            SessionState::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Success)
    }
}

/// What the UI renders. A plain value so the shell can poll or diff it
/// without holding any engine lock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub state_label: String,
    pub proposal: Option<VoiceCommandProposal>,
    /// False while the live proposal still needs clarification.
    pub confirm_enabled: bool,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
    /// Set when a capture-class failure surfaced; the UI routes the user
    /// into manual text entry instead of a dead end.
    pub offer_text_input: bool,
    pub result_summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(SessionState::Idle.label(), "idle");
        assert_eq!(SessionState::FileCapture.label(), "file_capture");
        assert_eq!(SessionState::TextInput.label(), "text_input");
        assert_eq!(SessionState::Success.label(), "success");
    }

    #[test]
    fn only_success_is_terminal() {
        for state in [
            SessionState::Idle,
            SessionState::Recording,
            SessionState::Breakout,
            SessionState::Confirming,
            SessionState::Error,
            SessionState::TextInput,
        ] {
            assert!(!state.is_terminal(), "{state:?}");
        }
        assert!(SessionState::Success.is_terminal());
    }
}
