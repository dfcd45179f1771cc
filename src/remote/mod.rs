//! Client for the remote flash note service.
//!
//! The whole note collection comes back from a single POST. There is no
//! pagination support: if the service ever starts paging, only the first page
//! is seen and [`FetchedNotes::is_truncated`] reports it.

pub mod types;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};

use crate::error::{Result, SharkError};

pub use types::{ExtraReference, NoteInfo, NoteListResponse, NoteMeta, RawNote};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36";
const PRIORITY: &str = "u=1, i";

/// Service error numbers that mean the cookie was not accepted
const AUTH_ERR_NOS: [i64; 2] = [401, 403];

/// Notes returned by one fetch, plus the total the service claims to have
#[derive(Debug, Clone, Default)]
pub struct FetchedNotes {
    pub notes: Vec<RawNote>,
    pub reported_count: Option<i64>,
}

impl FetchedNotes {
    pub fn is_truncated(&self) -> bool {
        matches!(self.reported_count, Some(count) if count > self.notes.len() as i64)
    }
}

/// Anything that can produce the full remote note collection
#[async_trait]
pub trait NoteSource: Send + Sync {
    async fn fetch_all_notes(&self, cookie: &str) -> Result<FetchedNotes>;
}

/// HTTP client for the note list endpoint
pub struct RemoteNoteClient {
    endpoint: String,
    client: Client,
}

impl RemoteNoteClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SharkError::Network(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[async_trait]
impl NoteSource for RemoteNoteClient {
    async fn fetch_all_notes(&self, cookie: &str) -> Result<FetchedNotes> {
        let cookie = cookie.trim();
        if cookie.is_empty() {
            return Err(SharkError::Auth("no cookie configured".to_string()));
        }

        tracing::debug!(endpoint = %self.endpoint, "requesting note list");

        let resp = self
            .client
            .post(&self.endpoint)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .header("priority", PRIORITY)
            .send()
            .await
            .map_err(|e| SharkError::Network(format!("note list request failed: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SharkError::Network(format!("reading note list response: {}", e)))?;

        parse_response(status, &body)
    }
}

/// Classify an HTTP response from the note list endpoint.
pub fn parse_response(status: StatusCode, body: &str) -> Result<FetchedNotes> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(SharkError::Auth(format!(
            "note service rejected the cookie (HTTP {})",
            status
        )));
    }
    if !status.is_success() {
        return Err(SharkError::Network(format!(
            "note service returned HTTP {}",
            status
        )));
    }

    let envelope: NoteListResponse = serde_json::from_str(body)
        .map_err(|e| SharkError::Protocol(format!("malformed note list: {}", e)))?;

    if envelope.err_no != 0 {
        let msg = envelope
            .err_msg
            .unwrap_or_else(|| "no message".to_string());
        if AUTH_ERR_NOS.contains(&envelope.err_no) {
            return Err(SharkError::Auth(format!(
                "note service rejected the cookie: {} ({})",
                msg, envelope.err_no
            )));
        }
        return Err(SharkError::Protocol(format!(
            "note service error {}: {}",
            envelope.err_no, msg
        )));
    }

    let fetched = FetchedNotes {
        notes: envelope.data.unwrap_or_default(),
        reported_count: envelope.count,
    };
    if fetched.is_truncated() {
        tracing::warn!(
            received = fetched.notes.len(),
            reported = ?fetched.reported_count,
            "note service reported more notes than it returned"
        );
    }

    Ok(fetched)
}
