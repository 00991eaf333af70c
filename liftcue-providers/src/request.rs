use serde::{Deserialize, Serialize};

/// Where the scheduling backend lives and how we authenticate to it.
///
/// The bearer credential is attached to every request explicitly; the
/// embedding context may block third-party cookies, so cookie auth is never
/// assumed to work.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub bearer_token: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: bearer_token.into(),
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub(crate) fn auth_header(&self) -> (String, String) {
        (
            "Authorization".into(),
            format!("Bearer {}", self.bearer_token),
        )
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("bearer_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Body {
    Empty,
    Json(String),
    MultipartFormData { boundary: String, bytes: Vec<u8> },
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                let sensitive = k.eq_ignore_ascii_case("authorization")
                    || k.to_ascii_lowercase().contains("api-key");
                let v = if sensitive { "[REDACTED]".into() } else { v.clone() };
                (k.clone(), v)
            })
            .collect();

        let body = match &self.body {
            Body::Empty => "Empty".to_string(),
            Body::Json(s) => format!("Json({} bytes)", s.len()),
            Body::MultipartFormData { bytes, .. } => {
                format!("MultipartFormData({} bytes)", bytes.len())
            }
        };

        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &redacted)
            .field("body", &body)
            .finish()
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = HttpRequest {
            method: "GET".into(),
            url: "https://api.example.com".into(),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: Body::Empty,
        };
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn debug_never_prints_the_bearer_token() {
        let req = HttpRequest {
            method: "POST".into(),
            url: "https://api.example.com/voice/parse".into(),
            headers: vec![("Authorization".into(), "Bearer session-token-123".into())],
            body: Body::Empty,
        };
        let s = format!("{req:?}");
        assert!(!s.contains("session-token-123"));
        assert!(s.contains("[REDACTED]"));

        let cfg = ApiConfig::new("https://api.example.com", "session-token-123");
        let s = format!("{cfg:?}");
        assert!(!s.contains("session-token-123"));
    }

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(
            join_url("https://api.example.com/", "/voice/parse"),
            "https://api.example.com/voice/parse"
        );
        assert_eq!(
            join_url("https://api.example.com", "voice/parse"),
            "https://api.example.com/voice/parse"
        );
    }
}
