//! Random identifier generation for short codes and user ids

use rand::{distr::Alphanumeric, Rng};

/// Length of every generated identifier
pub const ID_LENGTH: usize = 6;

/// How many fresh identifiers a caller mints before giving up on a collision
pub const MAX_ID_ATTEMPTS: usize = 8;

/// Generates a random 6-character alphanumeric identifier
///
/// No uniqueness check happens here. Callers insert with an
/// insert-if-absent primitive and mint again when the key is taken.
pub fn generate_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}
