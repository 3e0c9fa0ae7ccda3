//! Session cookie handling

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use super::token::SessionToken;

pub const DEFAULT_COOKIE_NAME: &str = "wedding_admin_session";

/// Name and transport flags of the cookie that carries the session token
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self::new(DEFAULT_COOKIE_NAME, true)
    }
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        Self {
            name: name.into(),
            secure,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie holding `encoded`, kept until the token's refresh window closes
    pub fn build(&self, encoded: String, token: &SessionToken, now: i64) -> Cookie<'static> {
        Cookie::build((self.name.clone(), encoded))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::seconds((token.refresh_exp - now).max(0)))
            .build()
    }

    /// Removal cookie
    pub fn clear(&self) -> Cookie<'static> {
        Cookie::build((self.name.clone(), ""))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::ZERO)
            .build()
    }

    /// Raw token from the request jar, if any
    pub fn read(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Whether a `Set-Cookie` header value targets this cookie
    pub fn is_set_by(&self, header_value: &str) -> bool {
        header_value
            .strip_prefix(self.name.as_str())
            .is_some_and(|rest| rest.starts_with('='))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::principal::{Principal, Role};
    use crate::core::auth::token::TokenTtl;
    use uuid::Uuid;

    const T0: i64 = 1_750_000_000;

    fn token() -> SessionToken {
        let principal = Principal {
            id: Uuid::new_v4(),
            email: "owner@example.com".to_string(),
            display_name: "Owner".to_string(),
            role: Role::Admin,
        };
        SessionToken::issue(&principal, T0, TokenTtl::default(), "wedding-admin")
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = SessionCookie::new("sid", true).build("abc".to_string(), &token(), T0);

        assert_eq!(cookie.name(), "sid");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::days(7)));
    }

    #[test]
    fn test_max_age_tracks_refresh_window() {
        let token = token();
        let cookie = SessionCookie::default().build("abc".to_string(), &token, T0 + 86_400);
        assert_eq!(cookie.max_age(), Some(Duration::days(6)));

        let late = SessionCookie::default().build("abc".to_string(), &token, token.refresh_exp + 5);
        assert_eq!(late.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn test_insecure_cookie_for_local_development() {
        let cookie = SessionCookie::new("sid", false).build("abc".to_string(), &token(), T0);
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn test_clear_cookie() {
        let cookie = SessionCookie::new("sid", false).clear();

        assert_eq!(cookie.name(), "sid");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn test_read_from_jar() {
        let cookies = SessionCookie::new("sid", false);
        let jar = CookieJar::new().add(Cookie::new("sid", "token-value"));
        assert_eq!(cookies.read(&jar).as_deref(), Some("token-value"));

        let empty = CookieJar::new().add(Cookie::new("sid", ""));
        assert_eq!(cookies.read(&empty), None);
        assert_eq!(cookies.read(&CookieJar::new()), None);
    }

    #[test]
    fn test_is_set_by() {
        let cookies = SessionCookie::new("sid", false);

        assert!(cookies.is_set_by("sid=abc; Path=/"));
        assert!(cookies.is_set_by("sid=; Max-Age=0"));
        assert!(!cookies.is_set_by("sidecar=abc"));
        assert!(!cookies.is_set_by("other=abc"));
    }
}
