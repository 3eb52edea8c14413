//! Password check for the single admin account.

use crate::errors::{Error, Result};
use subtle::ConstantTimeEq;

/// Checks `submitted` against the configured admin password.
///
/// Returns the session token on success. The comparison runs in constant time.
pub fn login(submitted: &str, admin_password: &str, session_token: &str) -> Result<String> {
    let matches: bool = submitted.as_bytes().ct_eq(admin_password.as_bytes()).into();
    if !matches {
        tracing::warn!("rejected login attempt");
        return Err(Error::Unauthorized);
    }
    Ok(session_token.to_string())
}
