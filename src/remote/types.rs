//! Wire types for the flash note list endpoint.

use serde::{Deserialize, Deserializer};

/// Response envelope returned by `note/list_all`
#[derive(Debug, Clone, Deserialize)]
pub struct NoteListResponse {
    #[serde(default)]
    pub err_no: i64,
    #[serde(default)]
    pub err_msg: Option<String>,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub data: Option<Vec<RawNote>>,
}

/// One flash note as the service sends it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawNote {
    pub note_info: NoteInfo,
    pub note_meta: NoteMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NoteInfo {
    pub content: String,
    /// JSON-encoded [`ExtraReference`], if the note quotes a web page
    #[serde(default)]
    pub extra: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NoteMeta {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    pub ctime: i64,
    pub mtime: i64,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Quoted source carried in `note_info.extra`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExtraReference {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ExtraReference {
    /// Decode the `extra` string. Anything that is not a JSON object of
    /// optional strings counts as no reference at all.
    pub fn parse(extra: Option<&str>) -> Option<Self> {
        let extra = extra?.trim();
        if extra.is_empty() {
            return None;
        }
        match serde_json::from_str::<Self>(extra) {
            Ok(reference) => Some(reference),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed note reference");
                None
            }
        }
    }
}
