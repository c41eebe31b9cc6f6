use crate::{AppState, handlers};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::get,
};

/// Largest document the knowledge-base form accepts.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Admin Router Module
///
/// The console behind `/{locale}/admin`. Handlers never check credentials
/// themselves: the route guard has already required a session cookie, and the
/// backend rejects a bad token with 401, which the handlers turn into a
/// redirect to the login page.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/{locale}/admin", get(handlers::admin_index))
        // GET|POST /{locale}/admin/knowledge-base
        // POST is a multipart form forwarded to /v1/admin/upload.
        .route(
            "/{locale}/admin/knowledge-base",
            get(handlers::knowledge_base)
                .post(handlers::upload_document)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // GET|POST /{locale}/admin/scraper
        .route(
            "/{locale}/admin/scraper",
            get(handlers::scraper).post(handlers::trigger_scraper),
        )
        .route("/{locale}/admin/settings", get(handlers::settings))
        // GET /{locale}/admin/settings/logs?level=&search=
        .route("/{locale}/admin/settings/logs", get(handlers::system_logs))
        // GET /{locale}/admin/settings/logs/export?level=&search=
        // Same filter as the page, answered as a CSV attachment.
        .route(
            "/{locale}/admin/settings/logs/export",
            get(handlers::export_logs),
        )
}
