//! Admin user management commands.

use solstice_admin::services::auth::hash_password;
use solstice_orders::db::UserRepository;
use solstice_orders::models::UserRole;

use super::{CommandError, connect};

/// Create an admin user.
///
/// # Errors
///
/// Returns `CommandError::InvalidInput` for a weak password and
/// `CommandError::Repository` if the email is already taken.
pub async fn create(email: &str, password: &str) -> Result<(), CommandError> {
    if password.len() < 8 {
        return Err(CommandError::InvalidInput(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let pool = connect().await?;
    let password_hash = hash_password(password)?;

    let user = UserRepository::new(&pool)
        .create(email, &password_hash, UserRole::Admin)
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "admin user created");
    Ok(())
}
