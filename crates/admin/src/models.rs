//! Session-backed models for the admin panel.

use serde::{Deserialize, Serialize};

use solstice_core::UserId;

/// Session keys used by the admin panel.
pub mod session_keys {
    /// The signed-in administrator.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

/// The signed-in administrator as stored in the session. Only users with
/// the admin role ever land here; the login route enforces that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: UserId,
    pub email: String,
}
