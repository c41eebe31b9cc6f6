//! Locale resolution for page requests.
//!
//! Pages live under `/<locale>/...`. The default locale may be omitted from
//! the URL: such requests are rewritten internally. A visitor who prefers
//! another locale is redirected to the prefixed URL instead.

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode, Uri, header, uri::PathAndQuery},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::locale::{Locale, negotiate, segments};

/// Cookie remembering the last locale the visitor browsed in.
pub const LOCALE_COOKIE: &str = "locale";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocaleRouting {
    /// Already prefixed with a supported locale; served as is.
    Prefixed(Locale),
    /// Served internally from this path, the browser URL stays unprefixed.
    Rewrite(String),
    /// The browser is sent to this prefixed URL.
    Redirect(String),
}

/// resolve
///
/// Decides how `path_and_query` is served given the visitor's preferred locale.
pub fn resolve(path_and_query: &str, preferred: Locale) -> LocaleRouting {
    if let Some(locale) = segments(path_and_query)
        .next()
        .and_then(|first| first.parse::<Locale>().ok())
    {
        return LocaleRouting::Prefixed(locale);
    }

    let target = if path_and_query.starts_with('/') {
        format!("/{preferred}{path_and_query}")
    } else {
        format!("/{preferred}/{path_and_query}")
    };
    // "/en/" and "/en/?x" collapse to "/en" and "/en?x".
    let collapsed = match target.split_once('?') {
        Some((path, query)) if path.ends_with('/') => {
            Some(format!("{}?{query}", path.trim_end_matches('/')))
        }
        None if target.ends_with('/') => Some(target.trim_end_matches('/').to_string()),
        _ => None,
    };
    let target = collapsed.unwrap_or(target);

    if preferred == Locale::DEFAULT {
        LocaleRouting::Rewrite(target)
    } else {
        LocaleRouting::Redirect(target)
    }
}

/// preferred_locale
///
/// The remembered locale cookie first, then `Accept-Language`, then the default.
pub fn preferred_locale(jar: &CookieJar, headers: &HeaderMap) -> Locale {
    jar.get(LOCALE_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
        .or_else(|| {
            headers
                .get(header::ACCEPT_LANGUAGE)
                .and_then(|value| value.to_str().ok())
                .and_then(negotiate)
        })
        .unwrap_or(Locale::DEFAULT)
}

/// locale_routing
///
/// Applies [`resolve`] to the request and runs the page router on the result.
pub async fn locale_routing(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(PathAndQuery::as_str)
        .unwrap_or("/")
        .to_owned();
    let preferred = preferred_locale(&jar, request.headers());

    match resolve(&path_and_query, preferred) {
        LocaleRouting::Prefixed(locale) => {
            let remembered = jar.get(LOCALE_COOKIE).map(|cookie| cookie.value().to_owned());
            let response = next.run(request).await;
            if remembered.as_deref() == Some(locale.code()) {
                return response;
            }
            let cookie = Cookie::build((LOCALE_COOKIE, locale.code()))
                .path("/")
                .same_site(SameSite::Lax);
            (jar.add(cookie), response).into_response()
        }
        LocaleRouting::Rewrite(target) => {
            let Some(uri) = rewrite_uri(request.uri(), &target) else {
                return StatusCode::BAD_REQUEST.into_response();
            };
            *request.uri_mut() = uri;
            next.run(request).await
        }
        LocaleRouting::Redirect(target) => Redirect::temporary(&target).into_response(),
    }
}

fn rewrite_uri(uri: &Uri, path_and_query: &str) -> Option<Uri> {
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse().ok()?);
    Uri::from_parts(parts).ok()
}
