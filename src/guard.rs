//! Edge route guard.
//!
//! Runs in front of every page request. Admin pages require the presence of a
//! session cookie; whether the cookie is still valid is for the backend to
//! decide when the page calls it with the bearer token.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::intl;
use crate::locale::{derive_locale, login_path, segments};
use crate::session::session_token;

/// First path segments that never go through the guard: the API namespace and
/// the static asset mounts.
const UNGUARDED_PREFIXES: &[&str] = &["api", "assets", "_next"];

/// Segment that marks the admin console.
const ADMIN_SEGMENT: &str = "admin";

/// RouteClass
///
/// Per-request classification; derived from the URL and the cookie jar only,
/// never cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    AdminAuthenticated,
    AdminUnauthenticated,
}

/// is_guarded
///
/// The guard's matcher. API calls, static assets and anything that looks like
/// a file (a segment containing `.`) bypass both the guard and locale routing.
pub fn is_guarded(path: &str) -> bool {
    let mut parts = segments(path).peekable();
    if parts
        .peek()
        .is_some_and(|first| UNGUARDED_PREFIXES.contains(first))
    {
        return false;
    }
    !parts.any(|segment| segment.contains('.'))
}

pub fn is_admin_path(path: &str) -> bool {
    segments(path).any(|segment| segment == ADMIN_SEGMENT)
}

/// classify
///
/// `has_session_cookie` is only consulted for admin paths.
pub fn classify(path: &str, has_session_cookie: impl FnOnce() -> bool) -> RouteClass {
    if !is_admin_path(path) {
        RouteClass::Public
    } else if has_session_cookie() {
        RouteClass::AdminAuthenticated
    } else {
        RouteClass::AdminUnauthenticated
    }
}

/// Presence of a non-empty session cookie. The value is not looked at.
pub fn has_session_cookie(jar: &CookieJar) -> bool {
    session_token(jar).is_some()
}

/// route_guard
///
/// Middleware applied outside the page router. Unauthenticated admin requests
/// are answered with a redirect to the login page of the locale named by the
/// path, without reaching locale routing; everything else is delegated to it.
pub async fn route_guard(jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();

    if !is_guarded(&path) {
        return next.run(request).await;
    }

    match classify(&path, || has_session_cookie(&jar)) {
        RouteClass::AdminUnauthenticated => {
            Redirect::temporary(&login_path(derive_locale(&path))).into_response()
        }
        RouteClass::Public | RouteClass::AdminAuthenticated => {
            intl::locale_routing(jar, request, next).await
        }
    }
}
