use std::env;
use std::time::Duration;

use reqwest::Url;

/// Backend base URL used when `API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Outbound request timeout used when `HTTP_TIMEOUT_SECS` is not set.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// AppConfig
///
/// Holds the portal's configuration. Immutable once loaded; handlers and the
/// `Backend` extractor pull it out of the application state via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Base URL of the chat/admin backend. Every `/v1/*` call is joined onto it.
    pub api_url: Url,
    // Socket address the HTTP server binds to.
    pub listen_addr: String,
    // Where the page-side session is read from.
    pub session_lookup: SessionLookup,
    // Directory served under `/assets`.
    pub assets_dir: String,
    // Runtime environment marker. Controls log format and cookie hardening.
    pub env: Env,
    // Upper bound for every backend and auth-server call.
    pub http_timeout: Duration,
}

/// Env
///
/// Runtime context: pretty logs and plain cookies locally, JSON logs and
/// `Secure` cookies in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// SessionLookup
///
/// How a page request resolves its current session before calling the backend.
#[derive(Clone, PartialEq, Debug)]
pub enum SessionLookup {
    /// The token carried by the session cookie is the session.
    Cookie,
    /// Ask the auth server, forwarding the session cookie.
    Remote { auth_url: Url },
}

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration for tests: local env, cookie lookup and the
    /// default backend address.
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API url is valid"),
            listen_addr: "127.0.0.1:3000".to_string(),
            session_lookup: SessionLookup::Cookie,
            assets_dir: "assets".to_string(),
            env: Env::Local,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (after `.env` has been
    /// loaded by `main`).
    ///
    /// # Panics
    /// Panics when `API_URL` or `AUTH_URL` is set but is not an absolute URL,
    /// when `SESSION_LOOKUP` names an unknown strategy, or when
    /// `HTTP_TIMEOUT_SECS` is not a positive integer. The portal refuses to
    /// start half-configured.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let api_url = env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_url = parse_base_url(&api_url).expect("FATAL: API_URL must be an absolute URL");

        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let session_lookup = match env::var("SESSION_LOOKUP").as_deref() {
            Err(_) | Ok("cookie") => SessionLookup::Cookie,
            Ok("remote") => {
                let auth_url =
                    env::var("AUTH_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
                SessionLookup::Remote {
                    auth_url: parse_base_url(&auth_url)
                        .expect("FATAL: AUTH_URL must be an absolute URL"),
                }
            }
            Ok(other) => panic!("FATAL: unknown SESSION_LOOKUP '{other}' (expected cookie|remote)"),
        };

        let http_timeout = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .expect("FATAL: HTTP_TIMEOUT_SECS must be a positive number of seconds"),
            Err(_) => DEFAULT_HTTP_TIMEOUT,
        };

        Self {
            api_url,
            listen_addr,
            session_lookup,
            assets_dir: env::var("ASSETS_DIR").unwrap_or_else(|_| "assets".to_string()),
            env,
            http_timeout,
        }
    }

    /// Cookies written by the portal carry `Secure` outside local development.
    pub fn secure_cookies(&self) -> bool {
        self.env == Env::Production
    }
}

/// Parses a base URL, rejecting relative and non-HTTP values.
pub fn parse_base_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}
