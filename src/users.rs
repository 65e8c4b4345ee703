//! User Directory and the registration/login flow built on it

use redb::{Database, ReadableDatabase, ReadableTable};
use std::sync::Arc;

use crate::database::TABLE_USERS;
use crate::error::AppError;
use crate::id::{generate_id, MAX_ID_ATTEMPTS};
use crate::model::UserRecord;
use crate::password::PasswordHasher;

#[derive(Clone)]
pub struct UserDirectory {
    db: Arc<Database>,
}

impl UserDirectory {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn get(&self, id: &str) -> Result<Option<UserRecord>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_USERS)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_str::<UserRecord>(value.value())?)),
            None => Ok(None),
        }
    }

    /// Linear scan for an exact, case-sensitive email match
    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_USERS)?;
        find_in(&table, email)
    }

    /// Inserts a user if both its id and its email are unused
    ///
    /// The email check and the write share one write transaction, so two
    /// racing registrations for the same address cannot both succeed.
    pub fn insert(&self, record: &UserRecord) -> Result<(), AppError> {
        let record_json = serde_json::to_string(record)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_USERS)?;

            if table.get(record.id.as_str())?.is_some() {
                return Err(AppError::IdCollision(record.id.clone()));
            }
            if find_in(&table, &record.email)?.is_some() {
                return Err(email_taken());
            }

            table.insert(record.id.as_str(), record_json.as_str())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    /// Creates an account and returns it; the caller establishes the session
    pub fn register(
        &self,
        hasher: &PasswordHasher,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, AppError> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password cannot be empty.".to_string(),
            ));
        }

        // Cheap early rejection before paying for the hash; `insert` re-checks atomically.
        if self.find_by_email(email)?.is_some() {
            return Err(email_taken());
        }

        let password_hash = hasher.hash_password(password)?;

        for _ in 0..MAX_ID_ATTEMPTS {
            let record = UserRecord {
                id: generate_id(),
                email: email.to_string(),
                password: password_hash.clone(),
            };

            match self.insert(&record) {
                Ok(()) => {
                    tracing::info!(user_id = %record.id, "registered new user");
                    return Ok(record);
                }
                Err(AppError::IdCollision(id)) => {
                    tracing::warn!(user_id = %id, "user id collision, minting another");
                }
                Err(err) => return Err(err),
            }
        }

        Err(AppError::IdExhausted(MAX_ID_ATTEMPTS))
    }

    /// Checks credentials and returns the matching user
    pub fn login(
        &self,
        hasher: &PasswordHasher,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, AppError> {
        let user = self.find_by_email(email)?.ok_or_else(|| {
            AppError::NotFound("No account is registered with that email.".to_string())
        })?;

        if !hasher.verify_password(password, &user.password)? {
            tracing::warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(AppError::Auth("Incorrect password.".to_string()));
        }

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(user)
    }
}

fn email_taken() -> AppError {
    AppError::Conflict("An account with that email already exists.".to_string())
}

fn find_in<T: ReadableTable<&'static str, &'static str>>(
    table: &T,
    email: &str,
) -> Result<Option<UserRecord>, AppError> {
    for entry in table.iter()? {
        let (_, value) = entry?;
        let user = serde_json::from_str::<UserRecord>(value.value())?;
        if user.email == email {
            return Ok(Some(user));
        }
    }

    Ok(None)
}
