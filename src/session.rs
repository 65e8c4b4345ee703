//! Session identity carried in a signed `user_id` cookie
//!
//! The cookie is only a claim: every request re-checks it against the User
//! Directory, and a claim for an unknown user is treated as logged out.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};

use crate::database::AppState;
use crate::error::AppError;
use crate::model::UserRecord;

pub const SESSION_COOKIE: &str = "user_id";

/// The caller's identity, resolved once per request and passed to handlers
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<UserRecord>);

impl CurrentUser {
    pub fn id(&self) -> Option<&str> {
        self.0.as_ref().map(|user| user.id.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.0.as_ref().map(|user| user.email.as_str())
    }

    pub fn is_logged_in(&self) -> bool {
        self.0.is_some()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = match SignedCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };

        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(CurrentUser(None));
        };

        let user = state.users.get(cookie.value())?;
        if user.is_none() {
            tracing::debug!(user_id = %cookie.value(), "session names an unknown user");
        }

        Ok(CurrentUser(user))
    }
}

/// Adds the signed session cookie for `user_id`
pub fn establish(jar: SignedCookieJar, user_id: &str) -> SignedCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, user_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    jar.add(cookie)
}

/// Expires the session cookie; harmless when no session exists
pub fn clear(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
