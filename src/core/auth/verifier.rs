//! Credential verification for the admin login

use std::sync::Arc;

use crate::core::db::UserStore;

use super::password::PasswordVerifier;
use super::principal::{Principal, normalize_email};
use super::service::AuthError;

/// Confirms an email/password pair belongs to an admin
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserStore>,
    passwords: Arc<dyn PasswordVerifier>,
}

impl CredentialVerifier {
    pub fn new(users: Arc<dyn UserStore>, passwords: Arc<dyn PasswordVerifier>) -> Self {
        Self { users, passwords }
    }

    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`]; a correct password on a non-admin
    /// account yields [`AuthError::NotAuthorized`].
    pub async fn verify(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let email = normalize_email(email);

        let Some(record) = self.users.find_by_email(&email).await? else {
            // Spend the same hashing time as a real comparison
            let _ = self.passwords.verify(password, self.passwords.dummy_hash());
            return Err(AuthError::InvalidCredentials);
        };

        if !self.passwords.verify(password, &record.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        if !record.principal.role.is_admin() {
            return Err(AuthError::NotAuthorized);
        }

        Ok(record.principal)
    }
}
