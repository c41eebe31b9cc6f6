use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, OriginalUri},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    api::{ApiClient, NavigationContext},
    config::{AppConfig, SessionLookup},
    session::{
        CookieSessionProvider, RemoteSessionProvider, SECURE_SESSION_COOKIE, SESSION_COOKIE,
        SessionState,
    },
};

/// HttpClient
///
/// The pooled outbound client shared by every request; pulled out of the
/// application state via `FromRef`.
#[derive(Clone, Default)]
pub struct HttpClient(pub reqwest::Client);

/// Backend Extractor Result
///
/// An [`ApiClient`] bound to the page request being served: its session
/// provider reads this request's cookies and its navigation context is this
/// request's path, so a 401 from the backend becomes a redirect to the login
/// page of the locale being browsed.
pub struct Backend(pub ApiClient);

/// Backend Extractor Implementation
///
/// 1. Dependency Resolution: configuration and the shared HTTP client.
/// 2. Session Binding: cookie-backed or auth-server-backed, per configuration.
/// 3. Navigation Binding: the path the browser asked for (before any internal
///    locale rewrite).
///
/// Never rejects: a request without a session still gets a client.
impl<S> FromRequestParts<S> for Backend
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
    HttpClient: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Dependency Resolution
        let config = AppConfig::from_ref(state);
        let HttpClient(http) = HttpClient::from_ref(state);

        // 2. Session Binding
        let jar = CookieJar::from_headers(&parts.headers);
        let session: SessionState = match &config.session_lookup {
            SessionLookup::Cookie => Arc::new(CookieSessionProvider::from_jar(&jar)),
            SessionLookup::Remote { auth_url } => {
                Arc::new(RemoteSessionProvider::new(http.clone(), auth_url.clone(), &jar))
            }
        };

        // 3. Navigation Binding
        let current_path = parts
            .extensions
            .get::<OriginalUri>()
            .map(|OriginalUri(uri)| uri.path().to_owned())
            .unwrap_or_else(|| parts.uri.path().to_owned());

        let client = ApiClient::new(http, config.api_url.clone(), session)
            .with_navigation(NavigationContext::new(current_path));
        Ok(Backend(client))
    }
}

/// session_cookie
///
/// The cookie written after a successful sign-in. `HttpOnly` keeps the token
/// out of page scripts.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let name = if secure {
        SECURE_SESSION_COOKIE
    } else {
        SESSION_COOKIE
    };
    Cookie::build((name, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// clear_session_cookie
///
/// Removes both spellings of the session cookie. Browsers ignore a
/// `__Secure-` cookie without the `Secure` attribute, removals included.
pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    [SESSION_COOKIE, SECURE_SESSION_COOKIE]
        .into_iter()
        .fold(jar, |jar, name| {
            jar.remove(
                Cookie::build(name)
                    .path("/")
                    .secure(name == SECURE_SESSION_COOKIE),
            )
        })
}
