//! Repository for users and their saved addresses.
//!
//! Authentication policy (hashing, role checks) lives in the binaries; this
//! module only moves rows.

use sqlx::{PgConnection, PgPool};

use solstice_core::UserId;

use super::RepositoryError;
use crate::models::{CustomerAddress, User, UserRole};

const USER_COLUMNS: &str = "id, email, password_hash, role, name, phone, created_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address (normalized to lowercase).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r"
            INSERT INTO users (email, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(email.trim().to_lowercase())
        .bind(password_hash)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(user)
    }

    /// Get a customer's default shipping address, if they have one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_default_address(
        &self,
        user_id: UserId,
    ) -> Result<Option<CustomerAddress>, RepositoryError> {
        let address = sqlx::query_as::<_, CustomerAddress>(
            r"
            SELECT id, user_id, name, phone, address1, address2,
                   city, state, zip, country, is_default,
                   created_at, updated_at
            FROM customer_addresses
            WHERE user_id = $1 AND is_default
            LIMIT 1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(address)
    }
}

/// Refresh a signed-in customer's profile name/phone, inside the commit
/// transaction. Empty values leave the stored profile untouched.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn update_profile(
    conn: &mut PgConnection,
    user_id: UserId,
    name: &str,
    phone: Option<&str>,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE users SET name = $2, phone = $3 WHERE id = $1")
        .bind(user_id)
        .bind(name)
        .bind(phone)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Shipping fields for the default-address upsert at checkout.
pub struct AddressFields<'f> {
    pub name: Option<&'f str>,
    pub phone: Option<&'f str>,
    pub address1: &'f str,
    pub address2: Option<&'f str>,
    pub city: &'f str,
    pub state: &'f str,
    pub zip: &'f str,
    pub country: &'f str,
}

/// Upsert a customer's single default shipping address, inside the commit
/// transaction: overwrite the existing default row if one exists, insert a
/// new default row otherwise.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the write fails.
pub async fn upsert_default_address(
    conn: &mut PgConnection,
    user_id: UserId,
    fields: &AddressFields<'_>,
) -> Result<(), RepositoryError> {
    let existing: Option<uuid::Uuid> = sqlx::query_scalar(
        r"
        SELECT id FROM customer_addresses
        WHERE user_id = $1 AND is_default
        LIMIT 1
        ",
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = existing {
        sqlx::query(
            r"
            UPDATE customer_addresses
            SET name = $2, phone = $3, address1 = $4, address2 = $5,
                city = $6, state = $7, zip = $8, country = $9,
                updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(fields.name)
        .bind(fields.phone)
        .bind(fields.address1)
        .bind(fields.address2)
        .bind(fields.city)
        .bind(fields.state)
        .bind(fields.zip)
        .bind(fields.country)
        .execute(&mut *conn)
        .await?;
    } else {
        sqlx::query(
            r"
            INSERT INTO customer_addresses (
                user_id, name, phone, address1, address2,
                city, state, zip, country, is_default
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE)
            ",
        )
        .bind(user_id)
        .bind(fields.name)
        .bind(fields.phone)
        .bind(fields.address1)
        .bind(fields.address2)
        .bind(fields.city)
        .bind(fields.state)
        .bind(fields.zip)
        .bind(fields.country)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
