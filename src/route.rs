//! Route definitions for the URL shortener
//!
//! This module configures all HTTP routes and maps them to their respective handlers.

use axum::routing::{get, post};
use axum::Router;

use crate::database::AppState;
use crate::handler::{
    create_url, delete_url, list_urls, login, login_form, logout, new_url_form, not_found,
    redirect_url, register, register_form, root, show_url, update_url, urls_json,
};

/// Creates the application router with all routes
///
/// # Route Definitions
///
/// - `GET /` - Redirects to `/urls` or `/login`
/// - `GET /urls.json` - Every link as JSON
/// - `GET|POST /urls` - List the caller's links / create a link
/// - `GET /urls/new` - Creation form
/// - `GET|POST /urls/{id}` - Show / update one link (owner only)
/// - `POST /urls/{id}/delete` - Delete one link (owner only)
/// - `GET /u/{id}` - Public redirect to the long URL
/// - `GET|POST /register`, `GET|POST /login`, `POST /logout` - Session management
///
/// ```no_run
/// # use tinyapp::database::{init_db, AppState};
/// # use tinyapp::password::PasswordHasher;
/// # use tinyapp::route::create_app;
/// # use axum_extra::extract::cookie::Key;
/// let db = init_db(None).unwrap();
/// let state = AppState::new(db, PasswordHasher::new(), Key::generate());
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/urls.json", get(urls_json))
        .route("/urls", get(list_urls).post(create_url))
        .route("/urls/new", get(new_url_form))
        .route("/urls/{id}", get(show_url).post(update_url))
        .route("/urls/{id}/delete", post(delete_url))
        // Public redirect endpoint - converts a short code to its long URL
        .route("/u/{id}", get(redirect_url))
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", post(logout))
        .fallback(not_found)
        .with_state(state)
}
