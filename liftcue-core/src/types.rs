use crate::error::CommandError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Idempotency key for one parsed command. The executor deduplicates on it,
/// so a retried confirm after a network blip does not double-apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub Uuid);

impl CommandId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Server-issued breakout session token. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BreakoutSessionId(pub String);

impl BreakoutSessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandMode {
    /// Put something on the calendar.
    Schedule,
    /// Record something that already happened.
    Log,
}

/// Description-based reference to an existing block. Users say "move
/// tomorrow's bench session", never an id, so the selector is a best-effort
/// combination of the attributes they actually speak.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_local: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_local: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_contains: Option<String>,
}

impl Selector {
    pub fn is_empty(&self) -> bool {
        self.date_local.is_none()
            && self.start_time_local.is_none()
            && self.block_type.is_none()
            && self.title_contains.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDraft {
    pub block_type: String,
    pub title: String,
    pub datetime_local: String,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Type-specific detail (sets/reps/weight...). Opaque to this pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTime {
    pub date_local: String,
    pub start_time_local: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Action {
    CreateBlock { block: BlockDraft },
    RescheduleBlock { target: Selector, new_time: NewTime },
    CancelBlock { target: Selector },
}

/// What the parsing service believes the user asked for. Immutable once
/// returned: "editing" a proposal means discarding it and re-entering the
/// flow with new text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCommandProposal {
    pub command_id: CommandId,
    pub mode: CommandMode,
    pub summary_text: String,
    pub proposed_action: Action,
    #[serde(default)]
    pub needs_clarification: Vec<String>,
    pub resolved_datetime: Option<String>,
}

impl VoiceCommandProposal {
    /// Confirm stays disabled while the parser still has questions.
    pub fn can_confirm(&self) -> bool {
        self.needs_clarification.is_empty()
    }
}

/// Output of exactly one capture strategy. The two-variant enum is what
/// enforces "exactly one of blob/transcript, never both, never neither".
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureResult {
    Audio {
        blob: Vec<u8>,
        mime_type: String,
        duration_hint: Option<f64>,
    },
    Transcript(String),
}

impl CaptureResult {
    /// A zero-byte recording is a capture failure, not a valid empty result.
    pub fn audio(
        blob: Vec<u8>,
        mime_type: impl Into<String>,
        duration_hint: Option<f64>,
    ) -> Result<Self, CommandError> {
        if blob.is_empty() {
            return Err(CommandError::NoAudioCaptured);
        }
        Ok(CaptureResult::Audio {
            blob,
            mime_type: mime_type.into(),
            duration_hint,
        })
    }

    pub fn transcript(text: impl Into<String>) -> Result<Self, CommandError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CommandError::NoAudioCaptured);
        }
        Ok(CaptureResult::Transcript(text))
    }

    pub fn is_transcript(&self) -> bool {
        matches!(self, CaptureResult::Transcript(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakoutStatus {
    Pending,
    Completed,
    Failed,
    Expired,
}

impl BreakoutStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, BreakoutStatus::Pending)
    }

    /// Breakout sessions only move forward. Re-observing the same status is
    /// fine; a terminal status never becomes anything else.
    pub fn can_transition_to(self, next: BreakoutStatus) -> bool {
        self == next || (self == BreakoutStatus::Pending && next.is_terminal())
    }
}

/// Client view of the server-held breakout record. The client only ever
/// reads this, via polling or the return-navigation fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakoutSession {
    pub session_id: BreakoutSessionId,
    pub capture_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    pub status: BreakoutStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,
    pub result_summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_audio_is_a_capture_failure() {
        assert_eq!(
            CaptureResult::audio(vec![], "audio/webm", None),
            Err(CommandError::NoAudioCaptured)
        );
        assert!(CaptureResult::audio(vec![1, 2], "audio/webm", Some(3.0)).is_ok());
    }

    #[test]
    fn blank_transcript_is_a_capture_failure() {
        assert_eq!(
            CaptureResult::transcript("   "),
            Err(CommandError::NoAudioCaptured)
        );
        assert!(CaptureResult::transcript("bench press").unwrap().is_transcript());
    }

    #[test]
    fn breakout_status_moves_forward_only() {
        use BreakoutStatus::*;
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Failed));
        assert!(Pending.can_transition_to(Expired));
        assert!(Pending.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Expired.can_transition_to(Completed));
        assert!(Failed.can_transition_to(Failed));
    }

    #[test]
    fn action_wire_format_uses_snake_case_tags() {
        let action = Action::CancelBlock {
            target: Selector {
                title_contains: Some("bench".into()),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "cancel_block");
        assert_eq!(json["target"]["titleContains"], "bench");
    }

    #[test]
    fn proposal_round_trips_and_gates_confirm_on_clarification() {
        let proposal = VoiceCommandProposal {
            command_id: CommandId::new(),
            mode: CommandMode::Log,
            summary_text: "Log a 30 minute run".into(),
            proposed_action: Action::CreateBlock {
                block: BlockDraft {
                    block_type: "cardio".into(),
                    title: "Run".into(),
                    datetime_local: "2026-08-29T07:00".into(),
                    duration_minutes: 30,
                    notes: None,
                    payload: None,
                },
            },
            needs_clarification: vec!["Which day did you mean?".into()],
            resolved_datetime: None,
        };
        assert!(!proposal.can_confirm());

        let json = serde_json::to_string(&proposal).unwrap();
        let back: VoiceCommandProposal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, proposal);
    }
}
