use async_trait::async_trait;
use axum_extra::extract::cookie::CookieJar;
use reqwest::{StatusCode, Url, header};
use serde::Deserialize;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Session cookie set by the auth server on plain-HTTP origins.
pub const SESSION_COOKIE: &str = "better-auth.session_token";
/// Same cookie under the `__Secure-` prefix used on HTTPS origins.
pub const SECURE_SESSION_COOKIE: &str = "__Secure-better-auth.session_token";

/// Session
///
/// An opaque server-issued credential. The token is only ever forwarded, never
/// parsed: signature and expiry checks belong to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: Option<SessionUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session lookup failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("session lookup returned {0}")]
    Status(StatusCode),
    #[error("invalid session lookup url: {0}")]
    InvalidUrl(String),
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

// 1. SessionProvider Contract
/// SessionProvider
///
/// The one capability everything that needs "the current session" depends on.
/// Callers must await it for every outgoing request; implementations may hit
/// the network.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self) -> Result<Option<Session>, SessionError>;
}

/// SessionState
///
/// Shared handle to whichever provider the current context uses.
pub type SessionState = Arc<dyn SessionProvider>;

/// Returns the first non-empty session cookie in `jar`, secure name first.
pub fn session_token(jar: &CookieJar) -> Option<(&'static str, String)> {
    [SECURE_SESSION_COOKIE, SESSION_COOKIE]
        .into_iter()
        .find_map(|name| {
            jar.get(name)
                .map(|cookie| cookie.value().to_string())
                .filter(|value| !value.is_empty())
                .map(|value| (name, value))
        })
}

// 2. Cookie-backed provider
/// CookieSessionProvider
///
/// Treats the session cookie of the incoming page request as the session.
/// No identity is known at this layer, so `user` is always `None`.
#[derive(Clone, Debug, Default)]
pub struct CookieSessionProvider {
    token: Option<String>,
}

impl CookieSessionProvider {
    pub fn from_jar(jar: &CookieJar) -> Self {
        Self {
            token: session_token(jar).map(|(_, token)| token),
        }
    }
}

#[async_trait]
impl SessionProvider for CookieSessionProvider {
    async fn current_session(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.token.clone().map(|token| Session { token, user: None }))
    }
}

// 3. Auth-server-backed provider
/// Body of `GET /api/auth/get-session`; `null` when signed out.
#[derive(Deserialize)]
struct RemoteSessionBody {
    session: RemoteSession,
    user: SessionUser,
}

#[derive(Deserialize)]
struct RemoteSession {
    token: String,
}

/// RemoteSessionProvider
///
/// Resolves the session by asking the auth server, forwarding the request's
/// session cookie. This is the only provider that suspends on the network.
#[derive(Clone)]
pub struct RemoteSessionProvider {
    http: reqwest::Client,
    auth_url: Url,
    cookie: Option<(&'static str, String)>,
}

impl RemoteSessionProvider {
    pub fn new(http: reqwest::Client, auth_url: Url, jar: &CookieJar) -> Self {
        Self {
            http,
            auth_url,
            cookie: session_token(jar),
        }
    }

    fn endpoint(&self) -> Result<Url, SessionError> {
        let base = self.auth_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/api/auth/get-session"))
            .map_err(|e| SessionError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl SessionProvider for RemoteSessionProvider {
    async fn current_session(&self) -> Result<Option<Session>, SessionError> {
        // Without a cookie the auth server can only answer "signed out".
        let Some((name, value)) = &self.cookie else {
            return Ok(None);
        };

        let response = self
            .http
            .get(self.endpoint()?)
            .header(header::COOKIE, format!("{name}={value}"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SessionError::Status(response.status()));
        }

        let body: Option<RemoteSessionBody> = response.json().await?;
        Ok(body.map(|body| Session {
            token: body.session.token,
            user: Some(body.user),
        }))
    }
}

// 4. The Mock Implementation (For Tests)
/// MockSessionProvider
///
/// Deterministic provider for tests: a fixed session, no session, or a lookup
/// that always fails. Counts lookups so tests can assert one per request.
#[derive(Clone, Default)]
pub struct MockSessionProvider {
    session: Option<Session>,
    should_fail: bool,
    lookups: Arc<AtomicUsize>,
}

impl MockSessionProvider {
    pub fn with_token(token: &str) -> Self {
        Self {
            session: Some(Session {
                token: token.to_string(),
                user: None,
            }),
            ..Self::default()
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for MockSessionProvider {
    async fn current_session(&self) -> Result<Option<Session>, SessionError> {
        self.lookups
            .fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(SessionError::Unavailable(
                "Mock Session Error: Simulation requested".to_string(),
            ));
        }
        Ok(self.session.clone())
    }
}
