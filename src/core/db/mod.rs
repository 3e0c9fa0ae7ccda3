//! Database module
//!
//! Connection pool, models, and repositories for persistent storage using
//! PostgreSQL and SQLx.

pub mod models;
pub mod pool;
pub mod repositories;

pub use models::*;
pub use pool::{DbConfig, DbError, create_pool};
pub use repositories::{InMemoryUserStore, UserRepository, UserStore, UserStoreError};

pub use sqlx::PgPool;
