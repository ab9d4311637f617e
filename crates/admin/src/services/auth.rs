//! Admin authentication.
//!
//! Login verifies credentials *and* the admin role; a valid customer
//! password is still `NotAnAdmin` here. Password hashing lives here too so
//! the CLI can create admin accounts with the same parameters.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use thiserror::Error;

use solstice_orders::db::{RepositoryError, UserRepository};
use solstice_orders::models::{User, UserRole};

/// Errors from admin authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password pair did not match a user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Credentials were valid but the account is not an administrator.
    /// Reported to the client as invalid credentials.
    #[error("not an administrator")]
    NotAnAdmin,

    /// Password hashing failed.
    #[error("hash error: {0}")]
    Hash(String),

    /// Repository failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Login as an administrator.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on a bad email/password and
/// `AuthError::NotAnAdmin` when the account lacks the admin role.
pub async fn admin_login(pool: &PgPool, email: &str, password: &str) -> Result<User, AuthError> {
    let user = UserRepository::new(pool)
        .get_by_email(email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    verify_password(password, &user.password_hash)?;

    if user.role != UserRole::Admin {
        return Err(AuthError::NotAnAdmin);
    }

    Ok(user)
}

/// Hash a password with argon2id.
///
/// # Errors
///
/// Returns `AuthError::Hash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2 hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify_round_trip() {
        let hash = hash_password("hunter2hunter2").expect("hash");
        assert!(verify_password("hunter2hunter2", &hash).is_ok());
        assert!(verify_password("hunter3hunter3", &hash).is_err());
    }
}
