//! Path-based enforcement for the admin area
//!
//! [`RouteGuard::decide`] is a pure function of the request path and the
//! session produced by the refresh engine. Paths outside the protected
//! prefixes never consult the session.

use super::session::{Session, SignOutReason};

/// Login page; the Leptos router serves it at the same path
pub const LOGIN_PATH: &str = "/admin/login";
pub const DEFAULT_PROTECTED_PREFIXES: [&str; 2] = ["/admin", "/api/admin"];

/// What the gate wants done with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Not a protected path
    PassThrough,
    /// Protected path, access granted
    Allow,
    /// Send the browser to the login page
    Redirect(SignOutReason),
}

/// Protected prefixes; [`LOGIN_PATH`] is always exempt
#[derive(Debug, Clone)]
pub struct RouteGuard {
    protected_prefixes: Vec<String>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(DEFAULT_PROTECTED_PREFIXES)
    }
}

impl RouteGuard {
    pub fn new<I, S>(protected_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected_prefixes: protected_prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.trim_end_matches('/').is_empty())
                .map(|p| trim_trailing_slash(&p).to_string())
                .collect(),
        }
    }

    pub fn protected_prefixes(&self) -> &[String] {
        &self.protected_prefixes
    }

    /// Segment-aware prefix match: `/admin` covers `/admin` and `/admin/x`
    /// but not `/administrator`
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    pub fn is_login_path(&self, path: &str) -> bool {
        trim_trailing_slash(path) == LOGIN_PATH
    }

    pub fn decide(&self, path: &str, session: Option<&Session>) -> GateDecision {
        if !self.is_protected(path) {
            return GateDecision::PassThrough;
        }
        if self.is_login_path(path) {
            return GateDecision::Allow;
        }

        match session {
            None => GateDecision::Redirect(SignOutReason::Unauthorized),
            Some(s) if s.error.is_some() || !s.is_valid() => {
                GateDecision::Redirect(SignOutReason::SessionExpired)
            }
            Some(s) if !s.is_admin() => GateDecision::Redirect(SignOutReason::Unauthorized),
            Some(_) => GateDecision::Allow,
        }
    }

    /// Redirect target for a rejected request
    pub fn redirect_location(&self, reason: SignOutReason) -> String {
        reason.login_url(LOGIN_PATH)
    }
}

fn trim_trailing_slash(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::principal::{Principal, Role};
    use crate::core::auth::token::{SessionToken, TokenError, TokenTtl};
    use uuid::Uuid;

    const T0: i64 = 1_750_000_000;

    fn session_for(role: Role, error: Option<TokenError>, now: i64) -> Session {
        let principal = Principal {
            id: Uuid::new_v4(),
            email: "owner@example.com".to_string(),
            display_name: "Owner".to_string(),
            role,
        };
        let mut token = SessionToken::issue(&principal, T0, TokenTtl::default(), "x");
        token.error = error;
        Session::materialize(&token, now)
    }

    #[test]
    fn test_unprotected_paths_pass_through() {
        let guard = RouteGuard::default();

        for path in ["/", "/services", "/gallery/summer", "/api/bookings", "/administrator"] {
            assert_eq!(guard.decide(path, None), GateDecision::PassThrough, "{path}");
        }
    }

    #[test]
    fn test_login_path_always_allowed() {
        let guard = RouteGuard::default();
        let expired = session_for(Role::Admin, Some(TokenError::RefreshTokenExpired), T0);

        assert_eq!(guard.decide("/admin/login", None), GateDecision::Allow);
        assert_eq!(guard.decide("/admin/login/", None), GateDecision::Allow);
        assert_eq!(
            guard.decide("/admin/login", Some(&expired)),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_missing_session_is_unauthorized() {
        let guard = RouteGuard::default();

        assert_eq!(
            guard.decide("/admin", None),
            GateDecision::Redirect(SignOutReason::Unauthorized)
        );
        assert_eq!(
            guard.decide("/api/admin/bookings", None),
            GateDecision::Redirect(SignOutReason::Unauthorized)
        );
    }

    #[test]
    fn test_expired_session_redirects_with_reason() {
        let guard = RouteGuard::default();
        let expired = session_for(Role::Admin, Some(TokenError::RefreshTokenExpired), T0);

        assert_eq!(
            guard.decide("/admin/anything", Some(&expired)),
            GateDecision::Redirect(SignOutReason::SessionExpired)
        );
    }

    #[test]
    fn test_failed_renewal_redirects_as_expired() {
        let guard = RouteGuard::default();
        let failed = session_for(Role::Admin, Some(TokenError::RefreshAccessTokenError), T0);

        assert_eq!(
            guard.decide("/admin/bookings", Some(&failed)),
            GateDecision::Redirect(SignOutReason::SessionExpired)
        );
    }

    #[test]
    fn test_zero_time_remaining_is_expired() {
        let guard = RouteGuard::default();
        let stale = session_for(Role::Admin, None, T0 + 30 * 86_400);

        assert_eq!(
            guard.decide("/admin", Some(&stale)),
            GateDecision::Redirect(SignOutReason::SessionExpired)
        );
    }

    #[test]
    fn test_non_admin_is_unauthorized() {
        let guard = RouteGuard::default();
        let user = session_for(Role::User, None, T0);

        assert_eq!(
            guard.decide("/admin", Some(&user)),
            GateDecision::Redirect(SignOutReason::Unauthorized)
        );
    }

    #[test]
    fn test_valid_admin_allowed() {
        let guard = RouteGuard::default();
        let admin = session_for(Role::Admin, None, T0 + 60);

        assert_eq!(guard.decide("/admin", Some(&admin)), GateDecision::Allow);
        assert_eq!(
            guard.decide("/admin/promotions/42", Some(&admin)),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_custom_prefixes_are_normalized() {
        let guard = RouteGuard::new(["/backoffice/", "", "/api/private"]);

        assert_eq!(guard.protected_prefixes(), ["/backoffice", "/api/private"]);
        assert!(guard.is_protected("/backoffice"));
        assert!(!guard.is_protected("/admin"));
    }

    #[test]
    fn test_login_page_outside_prefixes_passes_through() {
        let guard = RouteGuard::new(["/backoffice"]);

        assert!(!guard.is_protected(LOGIN_PATH));
        assert_eq!(guard.decide(LOGIN_PATH, None), GateDecision::PassThrough);
    }

    #[test]
    fn test_redirect_location() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.redirect_location(SignOutReason::SessionExpired),
            "/admin/login?error=session_expired"
        );
        assert_eq!(
            guard.redirect_location(SignOutReason::Unauthorized),
            "/admin/login?error=unauthorized"
        );
    }
}
