//! Database repositories for the back office
//!
//! Repositories encapsulate data access and give the auth core a narrow,
//! injectable view of stored accounts.

pub mod user;

pub use user::{InMemoryUserStore, UserRepository, UserStore, UserStoreError};
