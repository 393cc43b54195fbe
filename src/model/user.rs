//! User model.

use serde::{Deserialize, Serialize};

use crate::Id;

/// Registered user. Identity is immutable once created except for password
/// rotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user id.
    pub id: Id,
    /// Login username (unique).
    pub username: String,
    /// Email address (unique).
    pub email: String,
    /// Password hash (Argon2 PHC string). Never exposed over the API.
    pub password: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: String,
}

/// Data for creating a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password hash.
    pub password: String,
}
