//! Database models for the back office
//!
//! This module defines the database entity structs that map to PostgreSQL tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::auth::principal::{Principal, Role, UserRecord};

// ============================================================================
// User Model
// ============================================================================

/// User entity as stored in the `users` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Role parsed from the stored text column.
    ///
    /// Unknown values degrade to [`Role::User`] so a malformed row can never
    /// grant admin access.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::User)
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        let role = user.role();
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            role,
        }
    }
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        let password_hash = user.password_hash.clone();
        Self {
            principal: user.into(),
            password_hash,
        }
    }
}

/// User data for creation (password_hash must already be hashed)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: Role,
}
