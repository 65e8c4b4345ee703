//! Database initialization, table definitions and shared application state
//!
//! Both directories live in one embedded redb database. By default it runs on
//! redb's in-memory backend, so every link and account disappears when the
//! process exits; a file path makes it durable instead.

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use redb::{backends::InMemoryBackend, Database, TableDefinition};
use std::sync::Arc;

use crate::links::LinkDirectory;
use crate::password::PasswordHasher;
use crate::users::UserDirectory;

/// Link Directory table
///
/// Key: short code (e.g. "b2xVn2")
/// Value: JSON-serialized `LinkRecord`, e.g.
/// '{"longURL":"http://www.lighthouselabs.ca","userID":"aJ48lW","createdAt":"..."}'
pub const TABLE_URLS: TableDefinition<&str, &str> = TableDefinition::new("urls_v1");

/// User Directory table
///
/// Key: user id
/// Value: JSON-serialized `UserRecord`
pub const TABLE_USERS: TableDefinition<&str, &str> = TableDefinition::new("users_v1");

/// Application state shared across all request handlers
///
/// Built once at startup and handed to the router; handlers never reach for
/// process-wide globals.
#[derive(Clone)]
pub struct AppState {
    pub links: LinkDirectory,
    pub users: UserDirectory,
    pub hasher: PasswordHasher,
    /// Signs and verifies the session cookie
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(db: Database, hasher: PasswordHasher, cookie_key: Key) -> Self {
        let db = Arc::new(db);

        Self {
            links: LinkDirectory::new(db.clone()),
            users: UserDirectory::new(db),
            hasher,
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Opens the database and creates the required tables
///
/// With `db_path` set, the database file is created or reopened at that
/// path. Without it, an in-memory database is used.
///
/// ```no_run
/// # use tinyapp::database::init_db;
/// let db = init_db(None).expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: Option<&str>) -> Result<Database, redb::Error> {
    let db = match db_path {
        Some(path) => Database::create(path)?,
        None => Database::builder().create_with_backend(InMemoryBackend::new())?,
    };

    // Tables must exist before the first read transaction tries to open them
    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_URLS)?;
        write_txn.open_table(TABLE_USERS)?;
    }
    write_txn.commit()?;

    Ok(db)
}
