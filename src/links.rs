//! Link Directory: short code to `LinkRecord`, with ownership-checked mutation
//!
//! Every read-check-write sequence runs inside one redb write transaction.
//! redb serializes writers, so an ownership check can never be invalidated by
//! a concurrent request before the mutation it guards lands.
//!
//! `update`, `delete` and `get_owned` check, in this order: the code exists,
//! the caller is logged in, the caller owns the link. A logged-out caller
//! poking at a missing code therefore sees "not found", never "log in".

use axum::http::HeaderValue;
use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::database::TABLE_URLS;
use crate::error::AppError;
use crate::id::{generate_id, MAX_ID_ATTEMPTS};
use crate::model::LinkRecord;

#[derive(Clone)]
pub struct LinkDirectory {
    db: Arc<Database>,
}

impl LinkDirectory {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Stores a new link owned by `owner` and returns its short code
    ///
    /// Codes are inserted only if absent; a collision mints a fresh code
    /// instead of overwriting another user's link.
    pub fn create(&self, long_url: &str, owner: Option<&str>) -> Result<String, AppError> {
        self.create_with(long_url, owner, generate_id)
    }

    /// Like `create`, drawing candidate codes from `mint_code`
    ///
    /// At most `MAX_ID_ATTEMPTS` candidates are tried before failing with
    /// `IdExhausted`; an existing code is never overwritten.
    pub fn create_with(
        &self,
        long_url: &str,
        owner: Option<&str>,
        mut mint_code: impl FnMut() -> String,
    ) -> Result<String, AppError> {
        let owner = logged_in(owner)
            .ok_or_else(|| AppError::Auth("You must be logged in to shorten URLs.".to_string()))?;

        validate_long_url(long_url)?;

        let record = LinkRecord {
            long_url: long_url.to_string(),
            user_id: owner.to_string(),
            created_at: Utc::now(),
        };
        let record_json = serde_json::to_string(&record)?;

        let write_txn = self.db.begin_write()?;
        let code = {
            let mut table = write_txn.open_table(TABLE_URLS)?;

            let mut minted = None;
            for _ in 0..MAX_ID_ATTEMPTS {
                let candidate = mint_code();
                if table.get(candidate.as_str())?.is_none() {
                    minted = Some(candidate);
                    break;
                }
                tracing::warn!(code = %candidate, "short code collision, minting another");
            }
            let code = minted.ok_or(AppError::IdExhausted(MAX_ID_ATTEMPTS))?;

            table.insert(code.as_str(), record_json.as_str())?;
            code
        };
        write_txn.commit()?;

        tracing::info!(code = %code, owner = %owner, "created short link");
        Ok(code)
    }

    pub fn get(&self, code: &str) -> Result<Option<LinkRecord>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_URLS)?;

        let record = match table.get(code)? {
            Some(value) => Some(serde_json::from_str::<LinkRecord>(value.value())?),
            None => None,
        };

        tracing::debug!(code = %code, found = record.is_some(), "link lookup");
        Ok(record)
    }

    /// Returns the link only if `requester` owns it
    pub fn get_owned(&self, code: &str, requester: Option<&str>) -> Result<LinkRecord, AppError> {
        let record = self.get(code)?.ok_or_else(|| not_found(code))?;
        authorize(code, &record, requester, "view")?;
        Ok(record)
    }

    /// Resolves a short code to its destination; public, no session needed
    pub fn resolve(&self, code: &str) -> Result<String, AppError> {
        self.get(code)?
            .map(|record| record.long_url)
            .ok_or_else(|| not_found(code))
    }

    /// All links owned by `owner`, keyed by short code; empty if there are none
    pub fn list_by_owner(&self, owner: &str) -> Result<BTreeMap<String, LinkRecord>, AppError> {
        let mut links = self.all()?;
        links.retain(|_, record| record.user_id == owner);
        Ok(links)
    }

    /// Every link in the directory, keyed by short code
    pub fn all(&self) -> Result<BTreeMap<String, LinkRecord>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_URLS)?;

        let mut links = BTreeMap::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            let record = serde_json::from_str::<LinkRecord>(value.value())?;
            links.insert(key.value().to_string(), record);
        }

        Ok(links)
    }

    /// Replaces the destination of a link owned by `requester`
    pub fn update(
        &self,
        code: &str,
        new_long_url: &str,
        requester: Option<&str>,
    ) -> Result<LinkRecord, AppError> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(TABLE_URLS)?;

            let mut record = match table.get(code)? {
                Some(value) => serde_json::from_str::<LinkRecord>(value.value())?,
                None => return Err(not_found(code)),
            };
            authorize(code, &record, requester, "edit")?;

            validate_long_url(new_long_url)?;

            record.long_url = new_long_url.to_string();
            let record_json = serde_json::to_string(&record)?;
            table.insert(code, record_json.as_str())?;
            record
        };
        write_txn.commit()?;

        tracing::info!(code = %code, "updated short link");
        Ok(updated)
    }

    /// Removes a link owned by `requester`
    pub fn delete(&self, code: &str, requester: Option<&str>) -> Result<(), AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_URLS)?;

            let record = match table.get(code)? {
                Some(value) => serde_json::from_str::<LinkRecord>(value.value())?,
                None => return Err(not_found(code)),
            };
            authorize(code, &record, requester, "delete")?;

            table.remove(code)?;
        }
        write_txn.commit()?;

        tracing::info!(code = %code, "deleted short link");
        Ok(())
    }
}

/// An empty user id counts as logged out
fn logged_in(requester: Option<&str>) -> Option<&str> {
    requester.filter(|id| !id.is_empty())
}

/// A destination must be non-blank and usable as a `Location` header value
fn validate_long_url(long_url: &str) -> Result<(), AppError> {
    if long_url.trim().is_empty() {
        return Err(AppError::Validation("Please provide a URL.".to_string()));
    }

    if HeaderValue::from_str(long_url).is_err() {
        return Err(AppError::Validation(
            "URLs cannot contain control characters or line breaks.".to_string(),
        ));
    }

    Ok(())
}

fn not_found(code: &str) -> AppError {
    AppError::NotFound(format!("Short URL \"{code}\" does not exist."))
}

fn authorize(
    code: &str,
    record: &LinkRecord,
    requester: Option<&str>,
    action: &str,
) -> Result<(), AppError> {
    let Some(requester) = logged_in(requester) else {
        return Err(AppError::Auth(format!(
            "You must be logged in to {action} this URL."
        )));
    };

    if requester != record.user_id {
        tracing::warn!(code = %code, requester = %requester, action, "rejected non-owner");
        return Err(AppError::Forbidden(format!(
            "You do not have permission to {action} this URL."
        )));
    }

    Ok(())
}
