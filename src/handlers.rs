use crate::{
    AppConfig,
    api::{ApiError, ApiResultExt},
    auth::{Backend, clear_session_cookie, session_cookie},
    locale::Locale,
    models::{
        ChatRequest, FeedbackRequest, LogFilter, LoginRequest, UploadedFile, logs_to_csv,
    },
    pages::{self, ChatView, Maud},
};
use axum::{
    Form,
    extract::{Multipart, OriginalUri, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

// --- Form & Query Structs ---

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChatQuery {
    pub session_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatForm {
    pub session_id: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct FeedbackForm {
    pub session_id: String,
    pub score: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Text shown in place of data when a backend call fails with anything but 401.
fn inline_message(err: &ApiError) -> String {
    match err {
        ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
        ApiError::Status { status, .. } => format!("The support service answered {status}."),
        _ => "The support service is unreachable. Please try again.".to_string(),
    }
}

// --- Public Pages ---

pub async fn landing(Path(locale): Path<Locale>, OriginalUri(uri): OriginalUri) -> Maud {
    pages::landing(locale, uri.path())
}

pub async fn dashboard(Path(locale): Path<Locale>, OriginalUri(uri): OriginalUri) -> Maud {
    pages::dashboard(locale, uri.path())
}

pub async fn login_page(Path(locale): Path<Locale>, OriginalUri(uri): OriginalUri) -> Maud {
    pages::login(locale, uri.path(), None)
}

/// login
///
/// Exchanges credentials for a backend token and stores it as the session
/// cookie. A 401 here means bad credentials, so it is shown on the form
/// instead of redirecting back to this same page.
pub async fn login(
    State(config): State<AppConfig>,
    Path(locale): Path<Locale>,
    OriginalUri(uri): OriginalUri,
    jar: CookieJar,
    Backend(api): Backend,
    Form(form): Form<LoginForm>,
) -> Response {
    let request = LoginRequest {
        username: form.username,
        password: form.password,
    };

    match api.auth().login(&request).await {
        Ok(token) => {
            let jar = jar.add(session_cookie(token.access_token, config.secure_cookies()));
            let target = format!("/{locale}/admin/knowledge-base");
            (jar, Redirect::to(&target)).into_response()
        }
        Err(err) if err.is_unauthorized() => (
            StatusCode::UNAUTHORIZED,
            pages::login(locale, uri.path(), Some("Invalid username or password.")),
        )
            .into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "sign-in failed");
            (
                StatusCode::BAD_GATEWAY,
                pages::login(locale, uri.path(), Some(inline_message(&err).as_str())),
            )
                .into_response()
        }
    }
}

pub async fn logout(Path(locale): Path<Locale>, jar: CookieJar) -> (CookieJar, Redirect) {
    (clear_session_cookie(jar), Redirect::to(&format!("/{locale}")))
}

// --- Chat ---

pub async fn chat_page(
    Path(locale): Path<Locale>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ChatQuery>,
) -> Maud {
    let session_id = query
        .session_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    pages::chat(
        locale,
        uri.path(),
        ChatView {
            session_id: &session_id,
            question: None,
            answer: None,
            error: None,
        },
    )
}

/// chat_send
///
/// Sends the visitor's message in the page's locale. The chat endpoint is
/// public, so a visitor without a session gets an answer too.
pub async fn chat_send(
    Path(locale): Path<Locale>,
    OriginalUri(uri): OriginalUri,
    Backend(api): Backend,
    Form(form): Form<ChatForm>,
) -> Result<Maud, ApiError> {
    let request = ChatRequest {
        message: form.message,
        session_id: form.session_id,
        language: locale,
    };

    let result = api.chat().send(&request).await.inline()?;
    let error = result.as_ref().err().map(inline_message);

    Ok(pages::chat(
        locale,
        uri.path(),
        ChatView {
            session_id: &request.session_id,
            question: Some(&request.message),
            answer: result.as_ref().ok(),
            error: error.as_deref(),
        },
    ))
}

pub async fn chat_history(
    Path((locale, session_id)): Path<(Locale, String)>,
    OriginalUri(uri): OriginalUri,
    Backend(api): Backend,
) -> Result<Maud, ApiError> {
    let result = api.chat().history(&session_id).await.inline()?;
    let error = result.as_ref().err().map(inline_message);

    Ok(pages::history(
        locale,
        uri.path(),
        &session_id,
        match (&result, &error) {
            (Ok(messages), _) => Ok(messages.as_slice()),
            (Err(_), Some(message)) => Err(message.as_str()),
            (Err(_), None) => Err(""),
        },
    ))
}

/// chat_feedback
///
/// Records a rating and returns to the conversation history.
pub async fn chat_feedback(
    Path((locale, message_id)): Path<(Locale, String)>,
    OriginalUri(uri): OriginalUri,
    Backend(api): Backend,
    Form(form): Form<FeedbackForm>,
) -> Result<Response, ApiError> {
    let request = FeedbackRequest {
        score: form.score,
        comment: form.comment.filter(|comment| !comment.trim().is_empty()),
    };
    let history = format!("/{locale}/chat/history/{}", urlencoding::encode(&form.session_id));

    match api.chat().feedback(&message_id, &request).await.inline()? {
        Ok(()) => Ok(Redirect::to(&history).into_response()),
        Err(err) => {
            let message = format!("Your feedback could not be recorded: {}", inline_message(&err));
            Ok((
                StatusCode::BAD_GATEWAY,
                pages::history(locale, uri.path(), &form.session_id, Err(message.as_str())),
            )
                .into_response())
        }
    }
}

// --- Admin Console ---

pub async fn admin_index(Path(locale): Path<Locale>) -> Redirect {
    Redirect::to(&format!("/{locale}/admin/knowledge-base"))
}

pub async fn knowledge_base(Path(locale): Path<Locale>, OriginalUri(uri): OriginalUri) -> Maud {
    pages::knowledge_base(locale, uri.path(), None, None)
}

/// upload_document
///
/// Forwards the `file` field of the form to the backend's ingestion endpoint.
pub async fn upload_document(
    Path(locale): Path<Locale>,
    OriginalUri(uri): OriginalUri,
    Backend(api): Backend,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let file = match read_file_field(&mut multipart).await {
        Ok(Some(file)) => file,
        Ok(None) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                pages::knowledge_base(locale, uri.path(), None, Some("Choose a file to upload.")),
            )
                .into_response());
        }
        Err(message) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                pages::knowledge_base(locale, uri.path(), None, Some(message.as_str())),
            )
                .into_response());
        }
    };

    tracing::info!(file_name = %file.file_name, size = file.bytes.len(), "uploading document");
    let result = api.admin().upload_document(file).await.inline()?;
    let error = result.as_ref().err().map(inline_message);

    Ok(pages::knowledge_base(locale, uri.path(), result.as_ref().ok(), error.as_deref())
        .into_response())
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("document").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| e.body_text())?;
        if bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

pub async fn scraper(Path(locale): Path<Locale>, OriginalUri(uri): OriginalUri) -> Maud {
    pages::scraper(locale, uri.path(), None, None)
}

pub async fn trigger_scraper(
    Path(locale): Path<Locale>,
    OriginalUri(uri): OriginalUri,
    Backend(api): Backend,
) -> Result<Maud, ApiError> {
    let result = api.admin().trigger_scraper().await.inline()?;
    let error = result.as_ref().err().map(inline_message);
    Ok(pages::scraper(locale, uri.path(), result.as_ref().ok(), error.as_deref()))
}

pub async fn settings(Path(locale): Path<Locale>, OriginalUri(uri): OriginalUri) -> Maud {
    pages::settings(locale, uri.path())
}

/// system_logs
///
/// Fetches the backend log feed and filters it by the `level`/`search` query.
pub async fn system_logs(
    Path(locale): Path<Locale>,
    OriginalUri(uri): OriginalUri,
    Query(filter): Query<LogFilter>,
    Backend(api): Backend,
) -> Result<Maud, ApiError> {
    let result = api.admin().logs().await.inline()?;

    Ok(match &result {
        Ok(list) => {
            let entries = filter.apply(&list.logs);
            pages::logs(locale, uri.path(), &filter, Ok(entries.as_slice()))
        }
        Err(err) => pages::logs(locale, uri.path(), &filter, Err(inline_message(err).as_str())),
    })
}

/// export_logs
///
/// The filtered log feed as a CSV download. Here a failure has no page to be
/// shown on, so it is answered with the error response directly.
pub async fn export_logs(
    Query(filter): Query<LogFilter>,
    Backend(api): Backend,
) -> Result<Response, ApiError> {
    let list = api.admin().logs().await?;
    let csv = logs_to_csv(filter.apply(&list.logs));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"system-logs.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
