//! Client for the chat/admin backend.
//!
//! Every call goes through [`ApiClient::execute`], which attaches the current
//! session as a bearer credential before sending and turns a 401 into a
//! redirect to the login page of the current locale.

mod admin;
mod auth;
mod chat;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use chat::ChatApi;

use axum::response::{IntoResponse, Redirect, Response};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::locale::{derive_locale, login_path};
use crate::session::SessionState;

/// NavigationContext
///
/// The page navigation a client call is made on behalf of. Only a client that
/// carries one may answer a 401 with a redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationContext {
    pub current_path: String,
}

impl NavigationContext {
    pub fn new(current_path: impl Into<String>) -> Self {
        Self {
            current_path: current_path.into(),
        }
    }

    /// Login page in the locale of the current location.
    pub fn login_target(&self) -> String {
        login_path(derive_locale(&self.current_path))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend rejected (or required) the credential.
    #[error("backend rejected the session")]
    Unauthorized { redirect_to: Option<String> },
    #[error("backend returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized {
                redirect_to: Some(target),
            } => Redirect::to(&target).into_response(),
            ApiError::Unauthorized { redirect_to: None } => StatusCode::UNAUTHORIZED.into_response(),
            other => {
                tracing::error!(error = %other, "backend call failed");
                (StatusCode::BAD_GATEWAY, "The support service is unavailable").into_response()
            }
        }
    }
}

/// ApiResultExt
///
/// Splits a backend result the way pages need it: a 401 keeps propagating (it
/// is handled globally by redirecting), any other failure becomes a value the
/// page can render inline.
pub trait ApiResultExt<T> {
    fn inline(self) -> Result<Result<T, ApiError>, ApiError>;
}

impl<T> ApiResultExt<T> for Result<T, ApiError> {
    fn inline(self) -> Result<Result<T, ApiError>, ApiError> {
        match self {
            Err(err) if err.is_unauthorized() => Err(err),
            other => Ok(other),
        }
    }
}

/// FastAPI error body.
#[derive(Deserialize)]
struct ErrorDetail {
    detail: serde_json::Value,
}

/// ApiClient
///
/// Cheap to clone; holds the pooled `reqwest::Client`, the backend base URL,
/// the session capability and, for page requests, the navigation context.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionState,
    navigation: Option<NavigationContext>,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: Url, session: SessionState) -> Self {
        Self {
            http,
            base_url,
            session,
            navigation: None,
        }
    }

    pub fn with_navigation(mut self, navigation: NavigationContext) -> Self {
        self.navigation = Some(navigation);
        self
    }

    pub fn chat(&self) -> ChatApi<'_> {
        ChatApi::new(self)
    }

    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(self)
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Joins `path` (starting with `/`) onto the base URL, keeping any path
    /// prefix the base URL already has.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}")).map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.http.request(method, self.url(path)?))
    }

    /// authorize
    ///
    /// Looks the session up afresh and, when it has a token, sets the bearer
    /// credential. A failed lookup is treated as "no session": the request is
    /// still sent and the backend decides.
    pub async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.current_session().await {
            Ok(Some(session)) if !session.token.is_empty() => {
                if let Some(user) = &session.user {
                    tracing::debug!(user_id = %user.id, role = ?user.role, "attaching session");
                }
                request.bearer_auth(session.token)
            }
            Ok(_) => request,
            Err(err) => {
                tracing::warn!(error = %err, "session lookup failed; sending unauthenticated");
                request
            }
        }
    }

    /// execute
    ///
    /// Sends `request` after `authorize` has completed and classifies the
    /// response. Successful responses are returned untouched.
    pub async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = self.authorize(request).await.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            let redirect_to = self.navigation.as_ref().map(NavigationContext::login_target);
            tracing::info!(
                url = %response.url(),
                redirect_to = ?redirect_to,
                "backend returned 401"
            );
            return Err(ApiError::Unauthorized { redirect_to });
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorDetail>(&body) {
            Ok(ErrorDetail {
                detail: serde_json::Value::String(detail),
            }) => detail,
            Ok(ErrorDetail { detail }) => detail.to_string(),
            Err(_) => body,
        };
        Err(ApiError::Status { status, message })
    }

    pub(crate) async fn json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        Ok(self.execute(request).await?.json::<T>().await?)
    }
}

/// Percent-encodes one path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
