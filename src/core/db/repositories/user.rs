//! User lookup for credential verification and session renewal
//!
//! [`UserStore`] is the seam the auth core depends on. [`UserRepository`]
//! backs it with PostgreSQL; [`InMemoryUserStore`] is used for local
//! development (seeded from the environment) and in tests.

use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::auth::principal::{Principal, Role, UserRecord, normalize_email};
use crate::core::db::models::{CreateUser, User};

/// User store error types
#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("User store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Read access to back-office accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up an account by (already normalized) email
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, UserStoreError>;

    /// Look up an account by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, UserStoreError>;
}

const USER_COLUMNS: &str = "id, email, password_hash, display_name, role, created_at, updated_at";

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an account (password_hash must already be hashed)
    pub async fn create(&self, dto: &CreateUser) -> Result<User, UserStoreError> {
        let email = normalize_email(&dto.email);
        if self.find_by_email(&email).await?.is_some() {
            return Err(UserStoreError::EmailAlreadyExists);
        }

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, display_name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&email)
        .bind(&dto.password_hash)
        .bind(&dto.display_name)
        .bind(dto.role.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, UserStoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user.map(UserRecord::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, UserStoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user.map(Principal::from))
    }
}

/// In-process user store keyed by id
#[derive(Default)]
pub struct InMemoryUserStore {
    users: DashMap<Uuid, UserRecord>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account, returning its principal
    pub fn insert(
        &self,
        email: &str,
        display_name: &str,
        role: Role,
        password_hash: impl Into<String>,
    ) -> Result<Principal, UserStoreError> {
        let email = normalize_email(email);
        if self.users.iter().any(|u| u.principal.email == email) {
            return Err(UserStoreError::EmailAlreadyExists);
        }

        let principal = Principal {
            id: Uuid::new_v4(),
            email,
            display_name: display_name.to_string(),
            role,
        };
        self.users.insert(
            principal.id,
            UserRecord {
                principal: principal.clone(),
                password_hash: password_hash.into(),
            },
        );

        Ok(principal)
    }

    /// Change an account's role; returns false if the id is unknown
    pub fn set_role(&self, id: Uuid, role: Role) -> bool {
        match self.users.get_mut(&id) {
            Some(mut record) => {
                record.principal.role = role;
                true
            }
            None => false,
        }
    }

    /// Remove an account; returns false if the id is unknown
    pub fn remove(&self, id: Uuid) -> bool {
        self.users.remove(&id).is_some()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, UserStoreError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.principal.email == email)
            .map(|u| u.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, UserStoreError> {
        Ok(self.users.get(&id).map(|u| u.principal.clone()))
    }
}
