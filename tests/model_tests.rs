use chatbot_portal::{
    locale::Locale,
    models::{ChatMessage, ChatRequest, ChatRole, FeedbackRequest, LogEntry, LogFilter, logs_to_csv},
};
use serde_json::json;

fn entry(timestamp: &str, level: &str, message: &str) -> LogEntry {
    LogEntry {
        timestamp: timestamp.to_string(),
        level: level.to_string(),
        message: message.to_string(),
    }
}

#[test]
fn test_chat_request_language_defaults_to_english() {
    let request: ChatRequest =
        serde_json::from_value(json!({ "message": "hi", "session_id": "s" })).unwrap();
    assert_eq!(request.language, Locale::En);

    let wire = serde_json::to_value(ChatRequest {
        language: Locale::Am,
        ..request
    })
    .unwrap();
    assert_eq!(wire["language"], "am");
}

#[test]
fn test_feedback_comment_is_omitted_when_absent() {
    let without = serde_json::to_value(FeedbackRequest {
        score: 0,
        comment: None,
    })
    .unwrap();
    assert_eq!(without, json!({ "score": 0 }));

    let with = serde_json::to_value(FeedbackRequest {
        score: 1,
        comment: Some("clear answer".to_string()),
    })
    .unwrap();
    assert_eq!(with["comment"], "clear answer");
}

#[test]
fn test_history_roles_are_lowercase() {
    let message: ChatMessage = serde_json::from_value(json!({
        "role": "assistant",
        "content": "Selam",
        "timestamp": "2024-01-01T00:00:00Z"
    }))
    .unwrap();
    assert_eq!(message.role, ChatRole::Assistant);
}

#[test]
fn test_log_filter_level_and_search() {
    let logs = vec![
        entry("2024-01-01T10:00:00Z", "INFO", "Scraper started"),
        entry("2024-01-01T10:05:00Z", "ERROR", "Upload failed"),
        entry("2024-01-02T09:00:00Z", "INFO", "upload complete"),
    ];

    let all = LogFilter {
        level: Some("ALL".to_string()),
        search: None,
    };
    assert_eq!(all.apply(&logs).len(), 3);

    let errors = LogFilter {
        level: Some("ERROR".to_string()),
        search: None,
    };
    assert_eq!(errors.apply(&logs), vec![&logs[1]]);

    let uploads = LogFilter {
        level: None,
        search: Some("UPLOAD".to_string()),
    };
    assert_eq!(uploads.apply(&logs).len(), 2);

    let by_day = LogFilter {
        level: Some(String::new()),
        search: Some("2024-01-02".to_string()),
    };
    assert_eq!(by_day.apply(&logs), vec![&logs[2]]);
}

#[test]
fn test_csv_quotes_every_field() {
    let logs = [entry("t1", "WARN", r#"disk "almost" full, 91%"#)];

    assert_eq!(
        logs_to_csv(&logs),
        "Timestamp,Level,Message\n\"t1\",\"WARN\",\"disk \"\"almost\"\" full, 91%\""
    );
    assert_eq!(logs_to_csv(&[]), "Timestamp,Level,Message");
}
