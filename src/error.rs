//! Error taxonomy shared by the directories and the request handlers
//!
//! Every failure a request can observe is one `AppError` variant, and every
//! variant maps to exactly one HTTP status. Client errors render their message
//! on the error page; internal errors are logged and rendered generically.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::view;

#[derive(Error, Debug)]
pub enum AppError {
    /// A required field was empty
    #[error("{0}")]
    Validation(String),

    /// The email is already registered
    #[error("{0}")]
    Conflict(String),

    /// Unknown short code or email
    #[error("{0}")]
    NotFound(String),

    /// Missing session or bad credentials
    #[error("{0}")]
    Auth(String),

    /// Authenticated, but not the owner of the link
    #[error("{0}")]
    Forbidden(String),

    /// A freshly minted identifier is already a key in its table
    #[error("identifier {0} is already taken")]
    IdCollision(String),

    #[error("could not mint a free identifier after {0} attempts")]
    IdExhausted(usize),

    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::IdCollision(_)
            | AppError::IdExhausted(_)
            | AppError::Storage(_)
            | AppError::Serialization(_)
            | AppError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// redb reports each phase of a transaction with its own error type; all of
// them fold into `redb::Error`.
macro_rules! storage_error_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for AppError {
                fn from(err: $ty) -> Self {
                    AppError::Storage(err.into())
                }
            }
        )*
    };
}

storage_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            return error_response(status, "Something went wrong on our side. Please try again.");
        }

        error_response(status, &self.to_string())
    }
}

/// Renders the shared error page with an explicit status
///
/// Used directly by handlers that deliberately report a different status than
/// the error's default (login failures are always 403).
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Html(view::error_page(status, message))).into_response()
}
