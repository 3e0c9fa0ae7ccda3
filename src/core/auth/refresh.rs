//! Token refresh engine
//!
//! Runs once per request that presents a token and decides whether the
//! token is still good, can be silently renewed, or is finished. The only
//! I/O is the principal re-fetch on the renewal branch, bounded by a
//! timeout. Any failure there fails closed.

use std::sync::Arc;
use std::time::Duration;

use crate::core::db::UserStore;

use super::token::{SessionToken, TokenError, TokenState};

/// Default bound on the principal re-fetch
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Result of running a token through the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Still inside the access window, or already terminal. Nothing to write.
    Unchanged(SessionToken),
    /// Access window restarted
    Renewed(SessionToken),
    /// Became terminal during this call
    Rejected(SessionToken),
    /// The store could not be reached in time. The token is terminal for
    /// this request only and must not be written back, so the next request
    /// retries the renewal.
    Unavailable(SessionToken),
}

impl RefreshOutcome {
    pub fn token(&self) -> &SessionToken {
        match self {
            RefreshOutcome::Unchanged(t)
            | RefreshOutcome::Renewed(t)
            | RefreshOutcome::Rejected(t)
            | RefreshOutcome::Unavailable(t) => t,
        }
    }

    pub fn into_token(self) -> SessionToken {
        match self {
            RefreshOutcome::Unchanged(t)
            | RefreshOutcome::Renewed(t)
            | RefreshOutcome::Rejected(t)
            | RefreshOutcome::Unavailable(t) => t,
        }
    }

    /// Whether the caller should send the token back to the client
    pub fn should_persist(&self) -> bool {
        matches!(self, RefreshOutcome::Renewed(_) | RefreshOutcome::Rejected(_))
    }
}

/// Decides and performs silent renewal
#[derive(Clone)]
pub struct RefreshEngine {
    users: Arc<dyn UserStore>,
    access_ttl_secs: i64,
    lookup_timeout: Duration,
}

impl RefreshEngine {
    pub fn new(users: Arc<dyn UserStore>, access_ttl_secs: i64) -> Self {
        Self {
            users,
            access_ttl_secs,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Set the bound on the principal re-fetch
    pub fn lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub async fn refresh(&self, token: &SessionToken, now: i64) -> RefreshOutcome {
        match token.state_at(now) {
            TokenState::Terminal(_) | TokenState::Valid => RefreshOutcome::Unchanged(token.clone()),
            TokenState::NeedsRefresh => self.renew(token, now).await,
            TokenState::Expired => {
                tracing::info!("Session {} reached the end of its refresh window", token.jti);
                RefreshOutcome::Rejected(token.with_error(TokenError::RefreshTokenExpired))
            }
        }
    }

    async fn renew(&self, token: &SessionToken, now: i64) -> RefreshOutcome {
        let lookup = tokio::time::timeout(self.lookup_timeout, self.users.find_by_id(token.sub));
        let rejected = token.with_error(TokenError::RefreshAccessTokenError);

        match lookup.await {
            Ok(Ok(Some(principal))) if principal.role.is_admin() && principal.role == token.role => {
                tracing::debug!("Renewed access window for user {}", token.sub);
                RefreshOutcome::Renewed(token.renewed(now, self.access_ttl_secs))
            }
            Ok(Ok(Some(principal))) => {
                tracing::warn!(
                    "User {} no longer holds the admin role (now {}); ending session",
                    token.sub,
                    principal.role
                );
                RefreshOutcome::Rejected(rejected)
            }
            Ok(Ok(None)) => {
                tracing::warn!("User {} no longer exists; ending session", token.sub);
                RefreshOutcome::Rejected(rejected)
            }
            Ok(Err(e)) => {
                tracing::error!("User lookup failed during renewal for {}: {}", token.sub, e);
                RefreshOutcome::Unavailable(rejected)
            }
            Err(_) => {
                tracing::error!(
                    "User lookup timed out after {:?} during renewal for {}",
                    self.lookup_timeout,
                    token.sub
                );
                RefreshOutcome::Unavailable(rejected)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::principal::{Principal, Role, UserRecord};
    use crate::core::auth::token::{DEFAULT_ACCESS_TTL_SECS, TokenTtl};
    use crate::core::db::UserStoreError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    const T0: i64 = 1_750_000_000;
    const HOUR: i64 = 60 * 60;
    const DAY: i64 = 24 * HOUR;

    #[derive(Clone, Copy)]
    enum Mode {
        Normal,
        Failing,
        Hanging,
    }

    /// Store holding at most one principal that counts id lookups
    struct CountingStore {
        principal: Mutex<Option<Principal>>,
        lookups: AtomicUsize,
        mode: Mode,
    }

    impl CountingStore {
        fn new(principal: Principal, mode: Mode) -> Arc<Self> {
            Arc::new(Self {
                principal: Mutex::new(Some(principal)),
                lookups: AtomicUsize::new(0),
                mode,
            })
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }

        fn set_role(&self, role: Role) {
            if let Some(p) = self.principal.lock().unwrap().as_mut() {
                p.role = role;
            }
        }

        fn delete(&self) {
            self.principal.lock().unwrap().take();
        }
    }

    #[async_trait]
    impl UserStore for CountingStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<UserRecord>, UserStoreError> {
            Ok(None)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, UserStoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                Mode::Normal => Ok(self
                    .principal
                    .lock()
                    .unwrap()
                    .clone()
                    .filter(|p| p.id == id)),
                Mode::Failing => Err(UserStoreError::Unavailable("connection refused".into())),
                Mode::Hanging => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(None)
                }
            }
        }
    }

    fn admin() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            email: "owner@example.com".to_string(),
            display_name: "Owner".to_string(),
            role: Role::Admin,
        }
    }

    fn setup(mode: Mode) -> (Arc<CountingStore>, RefreshEngine, SessionToken) {
        let principal = admin();
        let token = SessionToken::issue(&principal, T0, TokenTtl::default(), "wedding-admin");
        let store = CountingStore::new(principal, mode);
        let engine = RefreshEngine::new(store.clone(), DEFAULT_ACCESS_TTL_SECS);
        (store, engine, token)
    }

    // ========================================================================
    // Scenario Tests
    // ========================================================================

    #[tokio::test]
    async fn test_valid_token_is_unchanged_without_io() {
        let (store, engine, token) = setup(Mode::Normal);

        let outcome = engine.refresh(&token, T0 + HOUR).await;

        assert_eq!(outcome, RefreshOutcome::Unchanged(token));
        assert!(!outcome.should_persist());
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn test_silent_renewal() {
        let (store, engine, token) = setup(Mode::Normal);
        let now = T0 + 25 * HOUR;

        let outcome = engine.refresh(&token, now).await;

        let RefreshOutcome::Renewed(renewed) = &outcome else {
            panic!("expected renewal, got {:?}", outcome);
        };
        assert_eq!(renewed.access_exp, now + DAY);
        assert_eq!(renewed.refresh_exp, token.refresh_exp);
        assert!(renewed.error.is_none());
        assert!(outcome.should_persist());
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn test_demoted_principal_is_rejected() {
        let (store, engine, token) = setup(Mode::Normal);
        store.set_role(Role::User);

        let outcome = engine.refresh(&token, T0 + 25 * HOUR).await;

        let RefreshOutcome::Rejected(rejected) = &outcome else {
            panic!("expected rejection, got {:?}", outcome);
        };
        assert_eq!(rejected.error, Some(TokenError::RefreshAccessTokenError));
        assert_eq!(rejected.access_exp, token.access_exp);
        assert_eq!(rejected.refresh_exp, token.refresh_exp);
    }

    #[tokio::test]
    async fn test_deleted_principal_is_rejected() {
        let (store, engine, token) = setup(Mode::Normal);
        store.delete();

        let outcome = engine.refresh(&token, T0 + 25 * HOUR).await;

        assert!(matches!(outcome, RefreshOutcome::Rejected(_)));
        assert_eq!(
            outcome.token().error,
            Some(TokenError::RefreshAccessTokenError)
        );
    }

    #[tokio::test]
    async fn test_hard_expiry_without_io() {
        let (store, engine, token) = setup(Mode::Normal);

        let outcome = engine.refresh(&token, T0 + 8 * DAY).await;

        assert!(matches!(outcome, RefreshOutcome::Rejected(_)));
        assert_eq!(outcome.token().error, Some(TokenError::RefreshTokenExpired));
        assert_eq!(outcome.token().access_exp, token.access_exp);
        assert_eq!(store.lookups(), 0);
    }

    // ========================================================================
    // Property Tests
    // ========================================================================

    #[tokio::test]
    async fn test_idempotent_within_access_window() {
        let (store, engine, token) = setup(Mode::Normal);
        let now = T0 + 2 * HOUR;

        let first = engine.refresh(&token, now).await.into_token();
        let second = engine.refresh(&first, now).await.into_token();

        assert_eq!(first, second);
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn test_second_call_after_renewal_does_no_io() {
        let (store, engine, token) = setup(Mode::Normal);
        let now = T0 + 30 * HOUR;

        let renewed = engine.refresh(&token, now).await.into_token();
        let again = engine.refresh(&renewed, now).await;

        assert_eq!(again, RefreshOutcome::Unchanged(renewed));
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn test_boundary_is_inclusive_on_expiry_side() {
        let (store, engine, token) = setup(Mode::Normal);

        let before = engine.refresh(&token, token.access_exp - 1).await;
        assert!(matches!(before, RefreshOutcome::Unchanged(_)));
        assert_eq!(store.lookups(), 0);

        let at = engine.refresh(&token, token.access_exp).await;
        assert!(matches!(at, RefreshOutcome::Renewed(_)));
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn test_refresh_expiry_never_moves_and_windows_stay_ordered() {
        let (_store, engine, token) = setup(Mode::Normal);
        let mut current = token.clone();

        for day in 1..=9 {
            let now = T0 + day * DAY + HOUR;
            current = engine.refresh(&current, now).await.into_token();

            assert_eq!(current.refresh_exp, token.refresh_exp);
            assert!(current.access_exp <= current.refresh_exp);
        }

        assert_eq!(current.error, Some(TokenError::RefreshTokenExpired));
    }

    #[tokio::test]
    async fn test_terminal_token_is_stable() {
        let (store, engine, token) = setup(Mode::Normal);
        let terminal = token.with_error(TokenError::RefreshAccessTokenError);

        for now in [T0, T0 + 25 * HOUR, T0 + 8 * DAY] {
            let outcome = engine.refresh(&terminal, now).await;
            assert_eq!(outcome, RefreshOutcome::Unchanged(terminal.clone()));
        }
        assert_eq!(store.lookups(), 0);
    }

    // ========================================================================
    // Failure Mode Tests
    // ========================================================================

    #[tokio::test]
    async fn test_store_error_fails_closed_without_persisting() {
        let (store, engine, token) = setup(Mode::Failing);

        let outcome = engine.refresh(&token, T0 + 25 * HOUR).await;

        assert!(matches!(outcome, RefreshOutcome::Unavailable(_)));
        assert!(!outcome.should_persist());
        assert_eq!(
            outcome.token().error,
            Some(TokenError::RefreshAccessTokenError)
        );
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_timeout_fails_closed() {
        let (_store, engine, token) = setup(Mode::Hanging);
        let engine = engine.lookup_timeout(Duration::from_millis(500));

        let outcome = engine.refresh(&token, T0 + 25 * HOUR).await;

        assert!(matches!(outcome, RefreshOutcome::Unavailable(_)));
        assert_eq!(
            outcome.token().error,
            Some(TokenError::RefreshAccessTokenError)
        );
    }
}
