mod common;

use axum::http::{StatusCode, header};
use chatbot_portal::{
    AppConfig,
    guard::{RouteClass, classify, is_admin_path, is_guarded},
};
use common::{body_text, empty, get, location, portal, session_cookie};
use tower::ServiceExt;

// --- Matcher & Classification ---

#[test]
fn test_matcher_skips_api_assets_and_files() {
    assert!(!is_guarded("/api/health"));
    assert!(!is_guarded("/assets/style.css"));
    assert!(!is_guarded("/_next/static/chunk.js"));
    assert!(!is_guarded("/admin/logo.png"));
    assert!(!is_guarded("/favicon.ico"));

    assert!(is_guarded("/"));
    assert!(is_guarded("/en/admin/settings"));
    assert!(is_guarded("/apis"));
}

#[test]
fn test_admin_detection_is_per_segment() {
    assert!(is_admin_path("/admin"));
    assert!(is_admin_path("/am/admin/knowledge-base"));
    assert!(is_admin_path("/xx/admin/settings"));
    assert!(!is_admin_path("/en/administrator"));
    assert!(!is_admin_path("/en/chat"));
}

#[test]
fn test_cookie_is_only_checked_on_admin_paths() {
    let class = classify("/en/chat", || panic!("cookie probe must not run"));
    assert_eq!(class, RouteClass::Public);

    assert_eq!(
        classify("/en/admin", || true),
        RouteClass::AdminAuthenticated
    );
    assert_eq!(
        classify("/en/admin", || false),
        RouteClass::AdminUnauthenticated
    );
}

// --- Router Behaviour ---

#[tokio::test]
async fn test_unprefixed_admin_without_cookie_redirects_to_default_login() {
    let app = portal(AppConfig::default());

    let response = app
        .oneshot(empty(get("/admin/knowledge-base")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response).as_deref(), Some("/en/login"));
}

#[tokio::test]
async fn test_unsupported_locale_admin_redirects_to_default_login() {
    let app = portal(AppConfig::default());

    let response = app
        .oneshot(empty(get("/xx/admin/settings")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response).as_deref(), Some("/en/login"));
}

#[tokio::test]
async fn test_prefixed_admin_without_cookie_keeps_locale() {
    let app = portal(AppConfig::default());

    let response = app.oneshot(empty(get("/am/admin"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response).as_deref(), Some("/am/login"));
    // Locale routing was never reached, so no locale cookie is written.
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_empty_session_cookie_counts_as_absent() {
    let app = portal(AppConfig::default());

    let response = app
        .oneshot(empty(
            get("/en/admin/scraper").header(header::COOKIE, session_cookie("")),
        ))
        .await
        .unwrap();

    assert_eq!(location(&response).as_deref(), Some("/en/login"));
}

#[tokio::test]
async fn test_admin_with_cookie_is_delegated_to_locale_routing() {
    let app = portal(AppConfig::default());

    let response = app
        .oneshot(empty(
            get("/am/admin/scraper").header(header::COOKIE, session_cookie("anything")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.starts_with("locale=am"), "got {set_cookie}");
    assert!(body_text(response).await.contains("Run scraper now"));
}

#[tokio::test]
async fn test_secure_cookie_name_is_recognised() {
    let app = portal(AppConfig::default());

    let response = app
        .oneshot(empty(get("/en/admin/settings").header(
            header::COOKIE,
            "__Secure-better-auth.session_token=abc",
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unprefixed_admin_with_cookie_is_rewritten_to_default() {
    let app = portal(AppConfig::default());

    let response = app
        .oneshot(empty(
            get("/admin/knowledge-base").header(header::COOKIE, session_cookie("anything")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"lang="en""#));
    assert!(body.contains("Knowledge base"));
}

#[tokio::test]
async fn test_public_pages_need_no_cookie() {
    let app = portal(AppConfig::default());

    let response = app.oneshot(empty(get("/am/chat"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(r#"lang="am""#));
}

#[tokio::test]
async fn test_root_is_served_in_default_locale() {
    let app = portal(AppConfig::default());

    let response = app.oneshot(empty(get("/"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Start a conversation"));
}

#[tokio::test]
async fn test_preferred_locale_redirects_unprefixed_pages() {
    let app = portal(AppConfig::default());

    let by_header = app
        .clone()
        .oneshot(empty(
            get("/dashboard").header(header::ACCEPT_LANGUAGE, "am-ET,am;q=0.9,en;q=0.5"),
        ))
        .await
        .unwrap();
    assert_eq!(by_header.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&by_header).as_deref(), Some("/am/dashboard"));

    let by_cookie = app
        .oneshot(empty(
            get("/dashboard")
                .header(header::COOKIE, "locale=am")
                .header(header::ACCEPT_LANGUAGE, "en"),
        ))
        .await
        .unwrap();
    assert_eq!(location(&by_cookie).as_deref(), Some("/am/dashboard"));
}

#[tokio::test]
async fn test_api_namespace_bypasses_guard() {
    let app = portal(AppConfig::default());

    let response = app.oneshot(empty(get("/api/health"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_file_paths_bypass_guard() {
    let app = portal(AppConfig::default());

    let response = app.oneshot(empty(get("/admin/logo.png"))).await.unwrap();

    assert_ne!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert!(location(&response).is_none());
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = portal(AppConfig::default());

    let response = app.oneshot(empty(get("/api/health"))).await.unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}
