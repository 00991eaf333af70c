use crate::request::{ApiConfig, Body, HttpRequest};
use anyhow::Context;
use liftcue_core::{ExecutionOutcome, VoiceCommandProposal};
use serde_json::json;

/// Builds `POST /voice/execute`. The full approved action goes on the wire,
/// not just an identifier: the service must act on exactly what the user
/// saw, never on a re-derivation. `commandId` is the idempotency key.
pub fn build_execute_request(cfg: &ApiConfig, proposal: &VoiceCommandProposal) -> HttpRequest {
    let payload = json!({
        "commandId": proposal.command_id,
        "approvedAction": proposal.proposed_action,
        "mode": proposal.mode,
        "resolvedDatetime": proposal.resolved_datetime,
    });

    HttpRequest {
        method: "POST".into(),
        url: cfg.endpoint("/voice/execute"),
        headers: vec![
            ("Content-Type".into(), "application/json".into()),
            cfg.auth_header(),
        ],
        body: Body::Json(payload.to_string()),
    }
}

pub fn parse_execute_response(body: &[u8]) -> anyhow::Result<ExecutionOutcome> {
    serde_json::from_slice(body).context("decode execution JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftcue_core::{
        Action, CommandId, CommandMode, ExecutionStatus, NewTime, Selector,
    };

    fn proposal() -> VoiceCommandProposal {
        VoiceCommandProposal {
            command_id: CommandId::new(),
            mode: CommandMode::Schedule,
            summary_text: "Move Thursday's bench session to 18:30".into(),
            proposed_action: Action::RescheduleBlock {
                target: Selector {
                    date_local: Some("2026-09-03".into()),
                    block_type: Some("strength".into()),
                    title_contains: Some("bench".into()),
                    start_time_local: None,
                },
                new_time: NewTime {
                    date_local: "2026-09-03".into(),
                    start_time_local: "18:30".into(),
                },
            },
            needs_clarification: vec![],
            resolved_datetime: Some("2026-09-03T18:30".into()),
        }
    }

    #[test]
    fn wire_payload_carries_the_full_approved_action() {
        let cfg = ApiConfig::new("https://api.example.com", "tok");
        let p = proposal();
        let req = build_execute_request(&cfg, &p);

        assert!(req.url.ends_with("/voice/execute"));
        let Body::Json(s) = &req.body else {
            panic!("expected json");
        };
        let v: serde_json::Value = serde_json::from_str(s).unwrap();
        assert_eq!(v["commandId"], json!(p.command_id));
        assert_eq!(v["approvedAction"]["type"], "reschedule_block");
        assert_eq!(v["approvedAction"]["newTime"]["startTimeLocal"], "18:30");
        assert_eq!(v["mode"], "schedule");
        assert_eq!(v["resolvedDatetime"], "2026-09-03T18:30");
    }

    #[test]
    fn parses_an_outcome() {
        let body = br#"{"status":"succeeded","resultSummary":"Rescheduled to Thursday 18:30"}"#;
        let outcome = parse_execute_response(body).unwrap();
        assert_eq!(outcome.status, ExecutionStatus::Succeeded);
        assert_eq!(outcome.result_summary, "Rescheduled to Thursday 18:30");
    }
}
