//! Registration, login, logout and session cookie handling over HTTP

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use axum_extra::extract::cookie::Key;
use tower::ServiceExt;

use tinyapp::database::{init_db, AppState};
use tinyapp::password::PasswordHasher;
use tinyapp::route::create_app;
use tinyapp::session::SESSION_COOKIE;

fn setup_test_app() -> Router {
    let db = init_db(None).expect("Failed to initialize test database");
    let hasher = PasswordHasher::with_cost(1024, 1).expect("valid argon2 parameters");
    create_app(AppState::new(db, hasher, Key::generate()))
}

fn post_form(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn set_cookie(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .map(|value| value.to_str().unwrap())
}

fn location(response: &Response) -> &str {
    response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn test_register_sets_signed_session_cookie() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_form("/register", "email=user@example.com&password=secret", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/urls");

    let cookie = set_cookie(&response).expect("session cookie should be set");
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=")));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
}

#[tokio::test]
async fn test_register_rejects_empty_fields() {
    let app = setup_test_app();

    for form in ["email=&password=secret", "email=user@example.com&password=", ""] {
        let response = app.clone().oneshot(post_form("/register", form, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "form {form:?}");
        assert!(set_cookie(&response).is_none());
    }
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_form("/register", "email=user@example.com&password=secret", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .oneshot(post_form("/register", "email=user@example.com&password=other", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookie(&response).is_none());
}

#[tokio::test]
async fn test_login_failures_are_forbidden() {
    let app = setup_test_app();
    app.clone()
        .oneshot(post_form("/register", "email=user@example.com&password=secret", None))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_form("/login", "email=nobody@example.com&password=secret", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(set_cookie(&response).is_none());

    let response = app
        .oneshot(post_form("/login", "email=user@example.com&password=wrong", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(set_cookie(&response).is_none());
}

#[tokio::test]
async fn test_forms_redirect_when_logged_in() {
    let app = setup_test_app();

    let response = app.clone().oneshot(get("/login", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.clone().oneshot(get("/register", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_form("/register", "email=user@example.com&password=secret", None))
        .await
        .unwrap();
    let cookie = set_cookie(&response).unwrap().split(';').next().unwrap().to_string();

    for uri in ["/login", "/register"] {
        let response = app.clone().oneshot(get(uri, Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/urls");
    }
}

#[tokio::test]
async fn test_forged_cookie_is_anonymous() {
    let app = setup_test_app();

    let forged = format!("{SESSION_COOKIE}=someone");
    let response = app.clone().oneshot(get("/urls", Some(&forged))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.oneshot(get("/", Some(&forged))).await.unwrap();
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_cookie_from_another_key_is_anonymous() {
    let first = setup_test_app();
    let second = setup_test_app();

    let response = first
        .oneshot(post_form("/register", "email=user@example.com&password=secret", None))
        .await
        .unwrap();
    let cookie = set_cookie(&response).unwrap().split(';').next().unwrap().to_string();

    let response = second.oneshot(get("/urls", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_form("/register", "email=user@example.com&password=secret", None))
        .await
        .unwrap();
    let cookie = set_cookie(&response).unwrap().split(';').next().unwrap().to_string();

    let response = app.clone().oneshot(post_form("/logout", "", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let removal = set_cookie(&response).expect("logout should expire the cookie");
    assert!(removal.starts_with(&format!("{SESSION_COOKIE}=;")));
    assert!(removal.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
    let app = setup_test_app();

    let response = app.oneshot(post_form("/logout", "", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}
