//! Public views of a session
//!
//! [`Session`] is recomputed from the token on every request and never
//! stored. [`SessionStatus`] is what the status endpoint returns to the
//! browser; it only drives the countdown and forced sign-out, never
//! authorization.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::Role;
use super::token::{SessionToken, TokenError};

/// Status error reported when the request carried no usable token
pub const UNAUTHENTICATED: &str = "Unauthenticated";

/// Identity part of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub role: Role,
}

/// Session as seen by request handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: SessionUser,
    /// End of the current access window (Unix seconds)
    pub expires_at: i64,
    pub time_remaining_seconds: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TokenError>,
}

impl Session {
    /// Project a (post-refresh) token at `now`
    pub fn materialize(token: &SessionToken, now: i64) -> Self {
        Self {
            user: SessionUser {
                id: token.sub,
                role: token.role,
            },
            expires_at: token.access_exp,
            time_remaining_seconds: (token.access_exp - now).max(0),
            error: token.error,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.time_remaining_seconds > 0 && self.error.is_none()
    }

    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            is_valid: self.is_valid(),
            time_remaining_minutes: self.time_remaining_seconds / 60,
            next_refresh_hint: next_refresh_hint(self.time_remaining_seconds),
            error: self.error.map(|e| e.to_string()),
        }
    }
}

/// Session state reported to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub is_valid: bool,
    pub time_remaining_minutes: i64,
    pub next_refresh_hint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionStatus {
    /// Status for a request without a session
    pub fn unauthenticated() -> Self {
        Self {
            is_valid: false,
            time_remaining_minutes: 0,
            next_refresh_hint: next_refresh_hint(0),
            error: Some(UNAUTHENTICATED.to_string()),
        }
    }

    /// Any reported error ends the session on the client
    pub fn is_terminal(&self) -> bool {
        self.error.is_some()
    }
}

/// Why the browser is being sent back to the login page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignOutReason {
    SessionExpired,
    Unauthorized,
}

impl SignOutReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SignOutReason::SessionExpired => "session_expired",
            SignOutReason::Unauthorized => "unauthorized",
        }
    }

    /// Parse the `error` query value used on the login page
    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "session_expired" => Some(SignOutReason::SessionExpired),
            "unauthorized" => Some(SignOutReason::Unauthorized),
            _ => None,
        }
    }

    /// Text shown above the login form
    pub fn message(self) -> &'static str {
        match self {
            SignOutReason::SessionExpired => "Your session has ended. Please sign in again.",
            SignOutReason::Unauthorized => "Please sign in to continue.",
        }
    }

    /// `<login_path>?error=<reason>`
    pub fn login_url(self, login_path: &str) -> String {
        format!("{}?error={}", login_path, self.as_str())
    }
}

impl std::fmt::Display for SignOutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse, human-readable time until the access window ends
pub fn next_refresh_hint(seconds_remaining: i64) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    fn plural(n: i64, unit: &str) -> String {
        if n == 1 {
            format!("in 1 {unit}")
        } else {
            format!("in {n} {unit}s")
        }
    }

    match seconds_remaining {
        s if s <= 0 => "session ended".to_string(),
        s if s < MINUTE => "less than a minute".to_string(),
        s if s < HOUR => plural(s / MINUTE, "minute"),
        s if s < DAY => plural(s / HOUR, "hour"),
        s => plural(s / DAY, "day"),
    }
}
