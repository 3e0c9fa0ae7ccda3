//! Session token model
//!
//! A [`SessionToken`] carries two absolute expiries. The access expiry moves
//! forward on renewal; the refresh expiry is fixed when the token is issued
//! and bounds the life of the whole session. Timestamps are Unix seconds.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::{Principal, Role};

/// Default access window (24 hours)
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 24 * 60 * 60;

/// Default refresh window (7 days)
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Lengths of the two validity windows, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtl {
    pub access_secs: i64,
    pub refresh_secs: i64,
}

impl Default for TokenTtl {
    fn default() -> Self {
        Self {
            access_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_secs: DEFAULT_REFRESH_TTL_SECS,
        }
    }
}

/// Why a token stopped being renewable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenError {
    /// Both windows elapsed
    RefreshTokenExpired,
    /// Renewal was attempted but the principal could not be re-verified
    RefreshAccessTokenError,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::RefreshTokenExpired => write!(f, "RefreshTokenExpired"),
            TokenError::RefreshAccessTokenError => write!(f, "RefreshAccessTokenError"),
        }
    }
}

/// Which branch of the refresh state machine a token is in at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Carries an error; never renewed again
    Terminal(TokenError),
    /// Inside the access window
    Valid,
    /// Access window elapsed, refresh window still open
    NeedsRefresh,
    /// Refresh window elapsed
    Expired,
}

/// Signed session record held by the client in a cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Subject (principal id)
    pub sub: Uuid,
    pub role: Role,
    /// Issued at
    pub iat: i64,
    /// End of the access window
    pub access_exp: i64,
    /// End of the refresh window, fixed at issuance
    pub refresh_exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TokenError>,
    /// Issuer
    pub iss: String,
    /// Unique id for this session
    pub jti: String,
}

impl SessionToken {
    /// Mint a fresh token for a verified principal.
    ///
    /// This is the only place the refresh expiry is computed.
    pub fn issue(principal: &Principal, now: i64, ttl: TokenTtl, issuer: &str) -> Self {
        let refresh_exp = now + ttl.refresh_secs;
        Self {
            sub: principal.id,
            role: principal.role,
            iat: now,
            access_exp: (now + ttl.access_secs).min(refresh_exp),
            refresh_exp,
            error: None,
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Classify the token at `now`. Expiry boundaries are inclusive: at
    /// exactly `access_exp` the token needs renewal.
    pub fn state_at(&self, now: i64) -> TokenState {
        if let Some(error) = self.error {
            TokenState::Terminal(error)
        } else if now < self.access_exp {
            TokenState::Valid
        } else if now < self.refresh_exp {
            TokenState::NeedsRefresh
        } else {
            TokenState::Expired
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.error.is_some()
    }

    /// Copy with the access window restarted at `now`, never past the
    /// refresh expiry
    pub fn renewed(&self, now: i64, access_secs: i64) -> Self {
        Self {
            access_exp: (now + access_secs).min(self.refresh_exp),
            ..self.clone()
        }
    }

    /// Copy marked terminal; expiries are left untouched
    pub fn with_error(&self, error: TokenError) -> Self {
        Self {
            error: Some(error),
            ..self.clone()
        }
    }
}
