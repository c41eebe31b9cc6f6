use serde::{Deserialize, Serialize};

use crate::locale::Locale;

// --- Chat ---

/// ChatRequest
///
/// Body of `POST /v1/chat/send`. `session_id` groups the messages of one
/// conversation; the backend answers in `language`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    #[serde(default = "default_language")]
    pub language: Locale,
}

fn default_language() -> Locale {
    Locale::DEFAULT
}

/// A source passage the assistant based its answer on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub source: String,
    pub page: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub response_text: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

/// One entry of `GET /v1/chat/history/{session_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: String,
}

/// FeedbackRequest
///
/// Rating of one assistant answer. `comment` is left out of the body when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackRequest {
    pub score: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

// --- Auth ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

// --- Admin ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentStatus {
    pub doc_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LogEntryList {
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScraperStatus {
    pub job_id: String,
    pub status: String,
}

/// A file received from the knowledge-base form, on its way to the backend.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// LogFilter
///
/// Query parameters of the system-logs page. `level` must match exactly
/// (`ALL` or empty means every level); `search` matches the message
/// case-insensitively or the timestamp verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogFilter {
    pub level: Option<String>,
    pub search: Option<String>,
}

impl LogFilter {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        let level_ok = match self.level.as_deref() {
            None | Some("") | Some("ALL") => true,
            Some(level) => entry.level == level,
        };

        let search_ok = match self.search.as_deref() {
            None | Some("") => true,
            Some(needle) => {
                entry
                    .message
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
                    || entry.timestamp.contains(needle)
            }
        };

        level_ok && search_ok
    }

    pub fn apply<'a>(&self, logs: &'a [LogEntry]) -> Vec<&'a LogEntry> {
        logs.iter().filter(|entry| self.matches(entry)).collect()
    }
}

/// logs_to_csv
///
/// Renders log entries as CSV with a `Timestamp,Level,Message` header. Every
/// field is quoted and embedded quotes are doubled.
pub fn logs_to_csv<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> String {
    fn quote(field: &str) -> String {
        format!("\"{}\"", field.replace('"', "\"\""))
    }

    let mut lines = vec!["Timestamp,Level,Message".to_string()];
    lines.extend(entries.into_iter().map(|entry| {
        format!(
            "{},{},{}",
            quote(&entry.timestamp),
            quote(&entry.level),
            quote(&entry.message)
        )
    }));
    lines.join("\n")
}
