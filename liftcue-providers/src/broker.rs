use crate::request::{ApiConfig, Body, HttpRequest};
use anyhow::Context;
use liftcue_core::{BreakoutSession, BreakoutSessionId};
use serde_json::json;

/// Query parameter the external capture page appends when it navigates the
/// user back to us.
pub const RETURN_QUERY_PARAM: &str = "lc_breakout";

pub fn build_create_session_request(cfg: &ApiConfig, return_url: Option<&str>) -> HttpRequest {
    let payload = json!({ "returnUrl": return_url });

    HttpRequest {
        method: "POST".into(),
        url: cfg.endpoint("/voice/breakout/sessions"),
        headers: vec![
            ("Content-Type".into(), "application/json".into()),
            cfg.auth_header(),
        ],
        body: Body::Json(payload.to_string()),
    }
}

pub fn build_session_status_request(cfg: &ApiConfig, id: &BreakoutSessionId) -> HttpRequest {
    HttpRequest {
        method: "GET".into(),
        url: cfg.endpoint(&format!("/voice/breakout/sessions/{}", id.as_str())),
        headers: vec![("Accept".into(), "application/json".into()), cfg.auth_header()],
        body: Body::Empty,
    }
}

pub fn parse_session_response(body: &[u8]) -> anyhow::Result<BreakoutSession> {
    serde_json::from_slice(body).context("decode breakout session JSON")
}

/// Detects a breakout return navigation in `url`.
///
/// Returns the session token and the URL with the token stripped. The
/// caller must restore the stripped URL before fetching the result, so a
/// refresh cannot replay the reconciliation.
pub fn extract_breakout_return(url: &str) -> Option<(BreakoutSessionId, String)> {
    let mut parsed = url::Url::parse(url).ok()?;

    let token = parsed
        .query_pairs()
        .find(|(k, _)| k == RETURN_QUERY_PARAM)
        .map(|(_, v)| v.into_owned())?;
    if token.is_empty() {
        return None;
    }

    let remaining: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| k != RETURN_QUERY_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    parsed.set_query(None);
    if !remaining.is_empty() {
        parsed
            .query_pairs_mut()
            .extend_pairs(remaining.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    Some((BreakoutSessionId::new(token), parsed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftcue_core::BreakoutStatus;

    #[test]
    fn create_request_carries_the_return_url() {
        let cfg = ApiConfig::new("https://api.example.com", "tok");
        let req =
            build_create_session_request(&cfg, Some("https://app.example.com/planner"));
        assert!(req.url.ends_with("/voice/breakout/sessions"));
        let Body::Json(s) = &req.body else {
            panic!("expected json");
        };
        assert!(s.contains("https://app.example.com/planner"));
    }

    #[test]
    fn status_request_targets_the_session() {
        let cfg = ApiConfig::new("https://api.example.com", "tok");
        let req = build_session_status_request(&cfg, &BreakoutSessionId::new("bs-42"));
        assert_eq!(req.method, "GET");
        assert!(req.url.ends_with("/voice/breakout/sessions/bs-42"));
        assert_eq!(req.header("authorization"), Some("Bearer tok"));
    }

    #[test]
    fn parses_a_completed_session() {
        let body = br#"{
            "sessionId": "bs-42",
            "captureUrl": "https://capture.example.com/bs-42",
            "status": "completed",
            "transcript": "cancel tomorrow's spin class"
        }"#;
        let session = parse_session_response(body).unwrap();
        assert_eq!(session.status, BreakoutStatus::Completed);
        assert_eq!(
            session.transcript.as_deref(),
            Some("cancel tomorrow's spin class")
        );
    }

    #[test]
    fn return_extraction_strips_only_our_parameter() {
        let (id, cleaned) = extract_breakout_return(
            "https://app.example.com/planner?week=35&lc_breakout=bs-42",
        )
        .unwrap();
        assert_eq!(id.as_str(), "bs-42");
        assert_eq!(cleaned, "https://app.example.com/planner?week=35");

        let (_, cleaned) =
            extract_breakout_return("https://app.example.com/planner?lc_breakout=bs-9").unwrap();
        assert_eq!(cleaned, "https://app.example.com/planner");
    }

    #[test]
    fn urls_without_the_parameter_are_ignored() {
        assert!(extract_breakout_return("https://app.example.com/planner?week=35").is_none());
        assert!(extract_breakout_return("https://app.example.com/planner?lc_breakout=").is_none());
        assert!(extract_breakout_return("not a url").is_none());
    }
}
