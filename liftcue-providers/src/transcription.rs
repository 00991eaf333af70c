use crate::request::{ApiConfig, Body, HttpRequest};
use anyhow::{Context, anyhow};
use serde::Deserialize;

/// Builds the multipart upload for `POST /voice/transcribe`.
pub fn build_transcribe_request(cfg: &ApiConfig, blob: &[u8], mime_type: &str) -> HttpRequest {
    let boundary = format!("liftcue-{}", uuid::Uuid::new_v4().simple());

    let mut body: Vec<u8> = Vec::new();
    append_file(&mut body, &boundary, "audio", "capture", mime_type, blob);
    append_field(&mut body, &boundary, "mimeType", mime_type);
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    HttpRequest {
        method: "POST".into(),
        url: cfg.endpoint("/voice/transcribe"),
        headers: vec![
            (
                "Content-Type".into(),
                format!("multipart/form-data; boundary={}", boundary),
            ),
            ("Accept".into(), "application/json".into()),
            cfg.auth_header(),
        ],
        body: Body::MultipartFormData {
            boundary,
            bytes: body,
        },
    }
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    transcript: Option<String>,
}

/// An empty or missing transcript is a transcription failure, never an
/// empty-but-valid result.
pub fn parse_transcribe_response(body: &[u8]) -> anyhow::Result<String> {
    let resp: TranscribeResponse =
        serde_json::from_slice(body).context("decode transcription JSON")?;
    match resp.transcript {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(anyhow!("transcription service returned no text")),
    }
}

fn append_field(body: &mut Vec<u8>, boundary: &str, name: &str, value: &str) {
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
    );
    body.extend_from_slice(value.as_bytes());
    body.extend_from_slice(b"\r\n");
}

fn append_file(
    body: &mut Vec<u8>,
    boundary: &str,
    name: &str,
    filename: &str,
    mime_type: &str,
    bytes: &[u8],
) {
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            name, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_authorized_multipart_upload() {
        let cfg = ApiConfig::new("https://api.example.com", "tok");
        let req = build_transcribe_request(&cfg, &[1, 2, 3], "audio/webm");

        assert_eq!(req.method, "POST");
        assert!(req.url.ends_with("/voice/transcribe"));
        assert_eq!(req.header("authorization"), Some("Bearer tok"));

        match &req.body {
            Body::MultipartFormData { boundary, bytes } => {
                let s = String::from_utf8_lossy(bytes);
                assert!(s.contains("name=\"audio\""));
                assert!(s.contains("Content-Type: audio/webm"));
                assert!(s.contains("name=\"mimeType\""));
                assert!(s.ends_with(&format!("--{}--\r\n", boundary)));
            }
            _ => panic!("expected multipart"),
        }
    }

    #[test]
    fn parses_transcript() {
        let body = br#"{"transcript":"log a 30 minute run I just did"}"#;
        assert_eq!(
            parse_transcribe_response(body).unwrap(),
            "log a 30 minute run I just did"
        );
    }

    #[test]
    fn empty_or_missing_transcript_is_an_error() {
        assert!(parse_transcribe_response(br#"{"transcript":"  "}"#).is_err());
        assert!(parse_transcribe_response(br#"{}"#).is_err());
    }
}
