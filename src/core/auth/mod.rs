//! Admin authentication
//!
//! Session lifecycle for the admin area:
//! - Credential verification against the user store
//! - Signed session tokens with an access and a refresh window
//! - Per-request renewal through the refresh engine
//! - Route gating for the protected prefixes
//! - A client-side guard that polls the session status
//!
//! The token, session, gate and guard types are shared with the browser
//! build; everything touching secrets or the user store is server only.

pub mod gate;
pub mod guard;
pub mod principal;
pub mod session;
pub mod token;

#[cfg(feature = "ssr")]
pub mod api;
#[cfg(feature = "ssr")]
pub mod cookies;
#[cfg(feature = "ssr")]
pub mod jwt;
#[cfg(feature = "ssr")]
pub mod middleware;
#[cfg(feature = "ssr")]
pub mod password;
#[cfg(feature = "ssr")]
pub mod refresh;
#[cfg(feature = "ssr")]
pub mod service;
#[cfg(feature = "ssr")]
pub mod verifier;


pub use gate::{GateDecision, RouteGuard};
pub use guard::{
    DEFAULT_POLL_INTERVAL, GuardExit, GuardHandle, Sleeper, StatusCheckError, StatusSource,
    guard_channel, run_guard, status_from_response,
};
pub use principal::{Principal, Role, UserRecord, normalize_email};
pub use session::{Session, SessionStatus, SessionUser, SignOutReason, next_refresh_hint};
pub use token::{SessionToken, TokenError, TokenState, TokenTtl};

#[cfg(feature = "ssr")]
pub use api::{AuthApiState, auth_api_router};
#[cfg(feature = "ssr")]
pub use cookies::SessionCookie;
#[cfg(feature = "ssr")]
pub use jwt::{JwtConfig, JwtError, JwtService};
#[cfg(feature = "ssr")]
pub use middleware::{AdminSession, MaybeSession, session_middleware};
#[cfg(feature = "ssr")]
pub use password::{BcryptVerifier, PasswordVerifier};
#[cfg(feature = "ssr")]
pub use refresh::{RefreshEngine, RefreshOutcome};
#[cfg(feature = "ssr")]
pub use service::{AuthError, AuthService, LoginRequest};
#[cfg(feature = "ssr")]
pub use verifier::CredentialVerifier;
