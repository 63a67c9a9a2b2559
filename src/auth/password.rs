/// bcrypt password hashing

use bcrypt::{hash, verify};
use crate::auth::AuthError;

/// Hash a password with the given bcrypt cost
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(hash(password, cost)?)
}

/// Check a password against a stored hash
///
/// A malformed stored hash is reported as an error, not as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AuthError> {
    Ok(verify(password, password_hash)?)
}
