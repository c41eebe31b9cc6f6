use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Pages any visitor may open. Chat calls still carry the bearer token when
/// the visitor happens to be signed in.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /{locale}
        .route("/{locale}", get(handlers::landing))
        // GET|POST /{locale}/login
        // The form posts the credentials back to the same path.
        .route(
            "/{locale}/login",
            get(handlers::login_page).post(handlers::login),
        )
        // POST /{locale}/logout
        .route("/{locale}/logout", post(handlers::logout))
        .route("/{locale}/dashboard", get(handlers::dashboard))
        // GET|POST /{locale}/chat
        // GET starts (or resumes, with ?session_id=) a conversation; POST sends a message.
        .route(
            "/{locale}/chat",
            get(handlers::chat_page).post(handlers::chat_send),
        )
        .route(
            "/{locale}/chat/history/{session_id}",
            get(handlers::chat_history),
        )
        .route(
            "/{locale}/chat/feedback/{message_id}",
            post(handlers::chat_feedback),
        )
}
