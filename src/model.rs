//! Data models for the URL shortener application
//!
//! Records are stored as JSON strings in the redb tables, and the field names
//! on the wire (`longURL`, `userID`) are what `/urls.json` exposes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shortened link, keyed by its short code in the Link Directory
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LinkRecord {
    /// The destination the short code redirects to
    #[serde(rename = "longURL")]
    pub long_url: String,

    /// Id of the user that created the link. Never changes after creation.
    #[serde(rename = "userID")]
    pub user_id: String,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A registered account, keyed by `id` in the User Directory
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: String,

    /// Unique across all users, compared case-sensitively
    pub email: String,

    /// Argon2id PHC string; the plaintext password is never stored
    pub password: String,
}

/// Form body for creating or editing a link
#[derive(Deserialize, Debug)]
pub struct UrlForm {
    #[serde(rename = "longURL", default)]
    pub long_url: String,
}

/// Form body for registration and login
///
/// Missing fields deserialize as empty strings so that validation, not the
/// form extractor, decides how they are rejected.
#[derive(Deserialize, Debug)]
pub struct CredentialsForm {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,
}
