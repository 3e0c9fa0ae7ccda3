//! Authentication service
//!
//! Ties the credential verifier, token issuer, JWT codec and refresh engine
//! together. Handlers and middleware only talk to [`AuthService`].

use std::sync::Arc;
use std::time::Duration;

use crate::core::db::{UserStore, UserStoreError};

use super::jwt::{JwtError, JwtService};
use super::password::PasswordVerifier;
use super::principal::Principal;
use super::refresh::{RefreshEngine, RefreshOutcome};
use super::session::Session;
use super::token::{SessionToken, TokenError};
use super::verifier::CredentialVerifier;

/// Authentication error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Same message as [`AuthError::InvalidCredentials`] so the login
    /// response never reveals which accounts are admins
    #[error("Invalid email or password")]
    NotAuthorized,

    #[error("Your session has ended. Please sign in again.")]
    RefreshAccessTokenError,

    #[error("Your session has expired. Please sign in again.")]
    RefreshTokenExpired,

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<UserStoreError> for AuthError {
    fn from(err: UserStoreError) -> Self {
        AuthError::InternalError(err.to_string())
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken | JwtError::DecodingError(_) => AuthError::Unauthenticated,
            _ => AuthError::InternalError(err.to_string()),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::RefreshTokenExpired => AuthError::RefreshTokenExpired,
            TokenError::RefreshAccessTokenError => AuthError::RefreshAccessTokenError,
        }
    }
}

/// Login request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub principal: Principal,
    pub token: SessionToken,
    /// Signed form for the session cookie
    pub encoded: String,
}

/// A presented token after the refresh engine has run
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub outcome: RefreshOutcome,
    pub session: Session,
    /// Newly signed token to hand back to the client, when it changed
    pub reissued: Option<String>,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    verifier: CredentialVerifier,
    jwt: JwtService,
    engine: RefreshEngine,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(
        users: Arc<dyn UserStore>,
        passwords: Arc<dyn PasswordVerifier>,
        jwt: JwtService,
    ) -> Self {
        let engine = RefreshEngine::new(users.clone(), jwt.config().access_ttl_secs);
        Self {
            verifier: CredentialVerifier::new(users, passwords),
            jwt,
            engine,
        }
    }

    /// Set the bound on the principal re-fetch during renewal
    pub fn lookup_timeout(mut self, timeout: Duration) -> Self {
        self.engine = self.engine.lookup_timeout(timeout);
        self
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Verify credentials and mint a session token
    pub async fn login(&self, request: &LoginRequest, now: i64) -> Result<LoginResult, AuthError> {
        let principal = self.verifier.verify(&request.email, &request.password).await?;

        let config = self.jwt.config();
        let token = SessionToken::issue(&principal, now, config.ttl(), &config.issuer);
        let encoded = self.jwt.encode(&token)?;

        Ok(LoginResult {
            principal,
            token,
            encoded,
        })
    }

    /// Decode a presented token, run it through the refresh engine and
    /// project the result.
    ///
    /// Fails only when the token cannot be decoded; every lifecycle outcome
    /// is reported through the returned session.
    pub async fn resolve(&self, raw: &str, now: i64) -> Result<ResolvedSession, JwtError> {
        let token = self.jwt.decode(raw)?;
        let outcome = self.engine.refresh(&token, now).await;
        let session = Session::materialize(outcome.token(), now);

        let reissued = if outcome.should_persist() {
            match self.jwt.encode(outcome.token()) {
                Ok(encoded) => Some(encoded),
                Err(e) => {
                    tracing::error!("Failed to re-sign session token: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(ResolvedSession {
            outcome,
            session,
            reissued,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::jwt::JwtConfig;
    use crate::core::auth::password::BcryptVerifier;
    use crate::core::auth::principal::{Role, UserRecord};
    use crate::core::db::InMemoryUserStore;
    use uuid::Uuid;

    const T0: i64 = 1_750_000_000;
    const HOUR: i64 = 3600;

    fn setup() -> (AuthService, Arc<InMemoryUserStore>, Principal) {
        let passwords = Arc::new(BcryptVerifier::with_cost(4));
        let store = Arc::new(InMemoryUserStore::new());
        let admin = store
            .insert(
                "owner@example.com",
                "Owner",
                Role::Admin,
                passwords.hash("Bouquet2025!").unwrap(),
            )
            .unwrap();
        let jwt = JwtService::new(JwtConfig::new("service-test-secret"));

        (AuthService::new(store.clone(), passwords, jwt), store, admin)
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    // ========================================================================
    // Login Tests
    // ========================================================================

    #[tokio::test]
    async fn test_login_issues_token() {
        let (service, _, admin) = setup();

        let result = service
            .login(&login_request("owner@example.com", "Bouquet2025!"), T0)
            .await
            .unwrap();

        assert_eq!(result.principal, admin);
        assert_eq!(result.token.sub, admin.id);
        assert_eq!(result.token.access_exp, T0 + 24 * HOUR);
        assert_eq!(result.token.refresh_exp, T0 + 7 * 24 * HOUR);
        assert_eq!(service.jwt().decode(&result.encoded).unwrap(), result.token);
    }

    #[tokio::test]
    async fn test_login_failures_share_message() {
        let (service, store, _) = setup();
        store
            .insert(
                "assistant@example.com",
                "Assistant",
                Role::User,
                BcryptVerifier::with_cost(4).hash("Garland2025!").unwrap(),
            )
            .unwrap();

        let unknown = service
            .login(&login_request("ghost@example.com", "Bouquet2025!"), T0)
            .await
            .unwrap_err();
        let wrong = service
            .login(&login_request("owner@example.com", "nope"), T0)
            .await
            .unwrap_err();
        let not_admin = service
            .login(&login_request("assistant@example.com", "Garland2025!"), T0)
            .await
            .unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(wrong.to_string(), not_admin.to_string());
        assert!(matches!(not_admin, AuthError::NotAuthorized));
    }

    // ========================================================================
    // Resolve Tests
    // ========================================================================

    #[tokio::test]
    async fn test_resolve_valid_token_is_not_reissued() {
        let (service, _, _) = setup();
        let login = service
            .login(&login_request("owner@example.com", "Bouquet2025!"), T0)
            .await
            .unwrap();

        let resolved = service.resolve(&login.encoded, T0 + HOUR).await.unwrap();

        assert!(resolved.session.is_valid());
        assert!(resolved.reissued.is_none());
        assert!(matches!(resolved.outcome, RefreshOutcome::Unchanged(_)));
    }

    #[tokio::test]
    async fn test_resolve_renews_and_reissues() {
        let (service, _, _) = setup();
        let login = service
            .login(&login_request("owner@example.com", "Bouquet2025!"), T0)
            .await
            .unwrap();
        let now = T0 + 25 * HOUR;

        let resolved = service.resolve(&login.encoded, now).await.unwrap();

        let reissued = resolved.reissued.expect("renewed token should be re-signed");
        let token = service.jwt().decode(&reissued).unwrap();
        assert_eq!(token.access_exp, now + 24 * HOUR);
        assert_eq!(token.refresh_exp, login.token.refresh_exp);
        assert_eq!(resolved.session.expires_at, token.access_exp);
    }

    #[tokio::test]
    async fn test_resolve_demoted_user_marks_terminal() {
        let (service, store, admin) = setup();
        let login = service
            .login(&login_request("owner@example.com", "Bouquet2025!"), T0)
            .await
            .unwrap();
        store.set_role(admin.id, Role::User);

        let resolved = service.resolve(&login.encoded, T0 + 25 * HOUR).await.unwrap();

        assert_eq!(
            resolved.session.error,
            Some(TokenError::RefreshAccessTokenError)
        );
        let reissued = service.jwt().decode(&resolved.reissued.unwrap()).unwrap();
        assert!(reissued.is_terminal());
    }

    struct UnreachableStore;

    #[async_trait::async_trait]
    impl UserStore for UnreachableStore {
        async fn find_by_email(&self, _: &str) -> Result<Option<UserRecord>, UserStoreError> {
            Err(UserStoreError::Unavailable("connection refused".to_string()))
        }

        async fn find_by_id(&self, _: Uuid) -> Result<Option<Principal>, UserStoreError> {
            Err(UserStoreError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_resolve_store_outage_is_not_reissued() {
        let (healthy, _, _) = setup();
        let login = healthy
            .login(&login_request("owner@example.com", "Bouquet2025!"), T0)
            .await
            .unwrap();
        let service = AuthService::new(
            Arc::new(UnreachableStore),
            Arc::new(BcryptVerifier::with_cost(4)),
            healthy.jwt().clone(),
        );

        let resolved = service.resolve(&login.encoded, T0 + 25 * HOUR).await.unwrap();

        assert!(matches!(resolved.outcome, RefreshOutcome::Unavailable(_)));
        assert_eq!(
            resolved.session.error,
            Some(TokenError::RefreshAccessTokenError)
        );
        assert!(resolved.reissued.is_none());
    }

    #[tokio::test]
    async fn test_resolve_rejects_tampered_token() {
        let (service, _, _) = setup();
        let login = service
            .login(&login_request("owner@example.com", "Bouquet2025!"), T0)
            .await
            .unwrap();
        let tampered = format!("{}x", login.encoded);

        assert!(service.resolve(&tampered, T0).await.is_err());
    }

    // ========================================================================
    // Error Conversion Tests
    // ========================================================================

    #[test]
    fn test_auth_error_from_token_error() {
        assert!(matches!(
            AuthError::from(TokenError::RefreshTokenExpired),
            AuthError::RefreshTokenExpired
        ));
        assert!(matches!(
            AuthError::from(TokenError::RefreshAccessTokenError),
            AuthError::RefreshAccessTokenError
        ));
    }

    #[test]
    fn test_auth_error_from_jwt_error() {
        assert!(matches!(
            AuthError::from(JwtError::InvalidToken),
            AuthError::Unauthenticated
        ));
        assert!(matches!(
            AuthError::from(JwtError::EncodingError("boom".into())),
            AuthError::InternalError(_)
        ));
    }

    #[test]
    fn test_login_request_deserialization() {
        let json = r#"{"email": "owner@example.com", "password": "Bouquet2025!"}"#;
        let request: LoginRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.email, "owner@example.com");
        assert_eq!(request.password, "Bouquet2025!");
    }
}
