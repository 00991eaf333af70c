use crate::request::{ApiConfig, Body, HttpRequest};
use anyhow::Context;
use liftcue_core::VoiceCommandProposal;
use serde_json::json;

pub fn build_parse_request(cfg: &ApiConfig, transcript: &str) -> HttpRequest {
    let payload = json!({ "transcript": transcript });

    HttpRequest {
        method: "POST".into(),
        url: cfg.endpoint("/voice/parse"),
        headers: vec![
            ("Content-Type".into(), "application/json".into()),
            cfg.auth_header(),
        ],
        body: Body::Json(payload.to_string()),
    }
}

pub fn parse_proposal_response(body: &[u8]) -> anyhow::Result<VoiceCommandProposal> {
    serde_json::from_slice(body).context("decode proposal JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftcue_core::{Action, CommandMode};

    #[test]
    fn builds_authorized_json_request() {
        let cfg = ApiConfig::new("https://api.example.com/", "tok");
        let req = build_parse_request(&cfg, "bench press 3x10 at 80kg tomorrow 7pm");

        assert_eq!(req.method, "POST");
        assert_eq!(req.url, "https://api.example.com/voice/parse");
        assert_eq!(req.header("authorization"), Some("Bearer tok"));
        match &req.body {
            Body::Json(s) => assert!(s.contains("bench press")),
            _ => panic!("expected json"),
        }
    }

    #[test]
    fn parses_a_proposal() {
        let body = br#"{
            "commandId": "7f2c1fde-9f10-4a6b-8b4e-02f2a1e2be11",
            "mode": "schedule",
            "summaryText": "Bench press tomorrow at 19:00",
            "proposedAction": {
                "type": "create_block",
                "block": {
                    "blockType": "strength",
                    "title": "Bench press",
                    "datetimeLocal": "2026-08-30T19:00",
                    "durationMinutes": 60,
                    "payload": {"sets": 3, "reps": 10, "weightKg": 80}
                }
            },
            "needsClarification": [],
            "resolvedDatetime": "2026-08-30T19:00"
        }"#;

        let proposal = parse_proposal_response(body).unwrap();
        assert_eq!(proposal.mode, CommandMode::Schedule);
        assert!(proposal.can_confirm());
        match &proposal.proposed_action {
            Action::CreateBlock { block } => {
                assert_eq!(block.title, "Bench press");
                assert_eq!(block.duration_minutes, 60);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn garbage_body_is_an_error() {
        assert!(parse_proposal_response(b"not json").is_err());
    }
}
