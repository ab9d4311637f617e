//! Session-backed models for the storefront.

use serde::{Deserialize, Serialize};

use solstice_core::UserId;
use solstice_orders::models::UserRole;

/// Session keys used by the storefront.
pub mod session_keys {
    /// The signed-in user, if any.
    pub const CURRENT_USER: &str = "current_user";
}

/// The signed-in user as stored in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
}
