//! Server-rendered markup. Deliberately unstyled; the pages exist to carry
//! data from the backend to the browser.

use axum::{
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use maud::{DOCTYPE, Markup, html};

use crate::api::segment;
use crate::locale::{Locale, segments};
use crate::models::{ChatMessage, ChatResponse, DocumentStatus, LogEntry, LogFilter, ScraperStatus};

#[derive(Clone, Debug)]
#[must_use]
pub struct Maud(pub Markup);

impl IntoResponse for Maud {
    fn into_response(self) -> Response {
        (
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            )],
            self.0.0,
        )
            .into_response()
    }
}

/// Same page in another locale: the locale segment is replaced, or added when
/// the path has none.
pub fn switch_locale_path(current_path: &str, target: Locale) -> String {
    let mut parts: Vec<&str> = segments(current_path).collect();
    match parts.first().map(|first| first.parse::<Locale>()) {
        Some(Ok(_)) => parts[0] = target.code(),
        _ => parts.insert(0, target.code()),
    }
    format!("/{}", parts.join("/"))
}

fn layout(locale: Locale, current_path: &str, title: &str, body: Markup) -> Maud {
    Maud(html! {
        (DOCTYPE)
        html lang=(locale.code()) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href="/assets/style.css";
            }
            body {
                header {
                    nav {
                        a href={ "/" (locale) } { "Home" }
                        " "
                        a href={ "/" (locale) "/chat" } { "Chat" }
                        " "
                        a href={ "/" (locale) "/admin/knowledge-base" } { "Admin" }
                    }
                    ul.locales {
                        @for other in Locale::ALL {
                            li {
                                @if other == locale {
                                    strong { (other.label()) }
                                } @else {
                                    a href=(switch_locale_path(current_path, other)) hreflang=(other.code()) {
                                        (other.label())
                                    }
                                }
                            }
                        }
                    }
                }
                main { (body) }
            }
        }
    })
}

fn admin_layout(locale: Locale, current_path: &str, title: &str, body: Markup) -> Maud {
    layout(
        locale,
        current_path,
        title,
        html! {
            aside {
                ul {
                    li { a href={ "/" (locale) "/admin/knowledge-base" } { "Knowledge base" } }
                    li { a href={ "/" (locale) "/admin/scraper" } { "Scraper" } }
                    li { a href={ "/" (locale) "/admin/settings" } { "Settings" } }
                    li { a href={ "/" (locale) "/admin/settings/logs" } { "System logs" } }
                }
                form method="post" action={ "/" (locale) "/logout" } {
                    button type="submit" { "Sign out" }
                }
            }
            section { (body) }
        },
    )
}

fn inline_error(error: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = error {
            p.error role="alert" { (message) }
        }
    }
}

pub fn landing(locale: Locale, current_path: &str) -> Maud {
    layout(
        locale,
        current_path,
        "Support assistant",
        html! {
            h1 { "Answers, any time" }
            p { "Ask our assistant about services, documents and procedures." }
            a href={ "/" (locale) "/chat" } { "Start a conversation" }
        },
    )
}

pub fn login(locale: Locale, current_path: &str, error: Option<&str>) -> Maud {
    layout(
        locale,
        current_path,
        "Sign in",
        html! {
            h1 { "Welcome back" }
            (inline_error(error))
            form method="post" action={ "/" (locale) "/login" } {
                label { "Username" input type="text" name="username" required; }
                label { "Password" input type="password" name="password" required; }
                button type="submit" { "Sign in" }
            }
        },
    )
}

pub fn dashboard(locale: Locale, current_path: &str) -> Maud {
    layout(
        locale,
        current_path,
        "Dashboard",
        html! {
            h1 { "Dashboard" }
            ul {
                li { a href={ "/" (locale) "/chat" } { "New conversation" } }
                li { a href={ "/" (locale) "/admin/knowledge-base" } { "Manage knowledge base" } }
            }
        },
    )
}

pub struct ChatView<'a> {
    pub session_id: &'a str,
    pub question: Option<&'a str>,
    pub answer: Option<&'a ChatResponse>,
    pub error: Option<&'a str>,
}

pub fn chat(locale: Locale, current_path: &str, view: ChatView<'_>) -> Maud {
    layout(
        locale,
        current_path,
        "Chat",
        html! {
            h1 { "Chat" }
            @if let Some(question) = view.question {
                article.user { (question) }
            }
            @if let Some(answer) = view.answer {
                article.assistant {
                    p { (answer.response_text) }
                    p.confidence { "Confidence: " (format!("{:.0}%", answer.confidence_score * 100.0)) }
                    @if !answer.citations.is_empty() {
                        ol.citations {
                            @for citation in &answer.citations {
                                li {
                                    cite { (citation.source) ", p. " (citation.page) }
                                    blockquote { (citation.text) }
                                }
                            }
                        }
                    }
                }
            }
            (inline_error(view.error))
            form method="post" action={ "/" (locale) "/chat" } {
                input type="hidden" name="session_id" value=(view.session_id);
                textarea name="message" required {}
                button type="submit" { "Send" }
            }
            a href={ "/" (locale) "/chat/history/" (segment(view.session_id)) } { "Conversation history" }
        },
    )
}

pub fn history(
    locale: Locale,
    current_path: &str,
    session_id: &str,
    messages: Result<&[ChatMessage], &str>,
) -> Maud {
    layout(
        locale,
        current_path,
        "Conversation history",
        html! {
            h1 { "Conversation history" }
            @match messages {
                Ok([]) => { p { "No messages yet." } }
                Ok(messages) => {
                    ol.history {
                        @for (index, message) in messages.iter().enumerate() {
                            li {
                                strong { (format!("{:?}", message.role)) }
                                " "
                                time { (message.timestamp) }
                                p { (message.content) }
                                form method="post" action={ "/" (locale) "/chat/feedback/" (segment(&format!("{session_id}-{index}"))) } {
                                    input type="hidden" name="session_id" value=(session_id);
                                    select name="score" {
                                        option value="1" { "Helpful" }
                                        option value="0" { "Not helpful" }
                                    }
                                    input type="text" name="comment" placeholder="Comment (optional)";
                                    button type="submit" { "Rate" }
                                }
                            }
                        }
                    }
                }
                Err(error) => { (inline_error(Some(error))) }
            }
        },
    )
}

pub fn knowledge_base(
    locale: Locale,
    current_path: &str,
    uploaded: Option<&DocumentStatus>,
    error: Option<&str>,
) -> Maud {
    admin_layout(
        locale,
        current_path,
        "Knowledge base",
        html! {
            h1 { "Knowledge base" }
            @if let Some(status) = uploaded {
                p.notice { "Document " code { (status.doc_id) } ": " (status.status) }
            }
            (inline_error(error))
            form method="post" enctype="multipart/form-data" action={ "/" (locale) "/admin/knowledge-base" } {
                input type="file" name="file" required;
                button type="submit" { "Upload" }
            }
        },
    )
}

pub fn scraper(
    locale: Locale,
    current_path: &str,
    started: Option<&ScraperStatus>,
    error: Option<&str>,
) -> Maud {
    admin_layout(
        locale,
        current_path,
        "Scraper",
        html! {
            h1 { "Scraper" }
            @if let Some(job) = started {
                p.notice { "Job " code { (job.job_id) } ": " (job.status) }
            }
            (inline_error(error))
            form method="post" action={ "/" (locale) "/admin/scraper" } {
                button type="submit" { "Run scraper now" }
            }
        },
    )
}

pub fn settings(locale: Locale, current_path: &str) -> Maud {
    admin_layout(
        locale,
        current_path,
        "Settings",
        html! {
            h1 { "Settings" }
            ul {
                li { a href={ "/" (locale) "/admin/settings/logs" } { "System logs" } }
            }
        },
    )
}

const LOG_LEVELS: &[&str] = &["ALL", "INFO", "WARN", "ERROR"];

pub fn logs(
    locale: Locale,
    current_path: &str,
    filter: &LogFilter,
    entries: Result<&[&LogEntry], &str>,
) -> Maud {
    let selected = filter.level.as_deref().unwrap_or("ALL");
    let export_query = format!(
        "level={}&search={}",
        urlencoding::encode(selected),
        urlencoding::encode(filter.search.as_deref().unwrap_or_default())
    );
    admin_layout(
        locale,
        current_path,
        "System logs",
        html! {
            h1 { "System logs" }
            form method="get" action={ "/" (locale) "/admin/settings/logs" } {
                select name="level" {
                    @for level in LOG_LEVELS {
                        option value=(level) selected[*level == selected] { (level) }
                    }
                }
                input type="search" name="search" value=(filter.search.as_deref().unwrap_or_default());
                button type="submit" { "Filter" }
            }
            @match entries {
                Ok(entries) => {
                    a href={ "/" (locale) "/admin/settings/logs/export?" (export_query) } download="system-logs.csv" { "Export CSV" }
                    table {
                        thead { tr { th { "Timestamp" } th { "Level" } th { "Message" } } }
                        tbody {
                            @for entry in entries {
                                tr {
                                    td { (entry.timestamp) }
                                    td { (entry.level) }
                                    td { (entry.message) }
                                }
                            }
                        }
                    }
                }
                Err(error) => { (inline_error(Some(error))) }
            }
        },
    )
}
