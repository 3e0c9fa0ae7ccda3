//! Auth context for the admin UI
//!
//! This module provides a reactive authentication context that:
//! - Tracks whether an admin session exists
//! - Holds the latest session status reported by the server
//! - Handles login and sign-out
//!
//! The session token itself lives in an HttpOnly cookie and is never visible
//! here; the browser only sees what the status endpoint reports.

use leptos::prelude::*;
#[cfg(not(feature = "ssr"))]
use leptos::task::spawn_local;
use serde::{Deserialize, Serialize};

use crate::core::auth::gate::LOGIN_PATH;
use crate::core::auth::{SessionStatus, SessionUser, SignOutReason};
#[cfg(not(feature = "ssr"))]
use crate::core::auth::{Principal, StatusCheckError, status_from_response};

/// Authentication state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    /// Initial state, asking the server
    #[default]
    Loading,
    /// No usable session
    Unauthenticated,
    /// Signed in as an admin
    Authenticated(SessionUser),
}

/// Error body returned by the auth API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthApiError {
    pub error: String,
    pub code: String,
}

/// Auth context providing authentication state and actions
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// Current authentication state
    pub state: RwSignal<AuthState>,
    /// Last status reported by the server
    pub status: RwSignal<Option<SessionStatus>>,
    /// Loading state for auth operations
    pub loading: RwSignal<bool>,
    /// Error message from last operation
    pub error: RwSignal<Option<String>>,
}

impl AuthContext {
    /// Check if user is authenticated
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state.get(), AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<SessionUser> {
        match self.state.get() {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Clear error message
    pub fn clear_error(&self) {
        self.error.set(None);
    }

    /// Forget the session on this page
    pub fn clear(&self) {
        self.state.set(AuthState::Unauthenticated);
        self.status.set(None);
    }
}

/// Provide auth context to the component tree
pub fn provide_auth_context() -> AuthContext {
    // Start with Unauthenticated on both server and client to avoid hydration mismatch
    let ctx = AuthContext {
        state: RwSignal::new(AuthState::Unauthenticated),
        status: RwSignal::new(None),
        loading: RwSignal::new(false),
        error: RwSignal::new(None),
    };

    // Ask the server about the cookie once hydration is done
    #[cfg(not(feature = "ssr"))]
    {
        Effect::new(move |_| {
            ctx.state.set(AuthState::Loading);
            spawn_local(async move {
                restore_session(ctx).await;
            });
        });
    }

    provide_context(ctx);
    ctx
}

/// Get auth context from the component tree
pub fn use_auth_context() -> AuthContext {
    expect_context::<AuthContext>()
}

/// Where a sign-out sends the browser
pub fn sign_out_target(reason: Option<SignOutReason>) -> String {
    match reason {
        Some(reason) => reason.login_url(LOGIN_PATH),
        None => LOGIN_PATH.to_string(),
    }
}

/// Login request
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "ssr", allow(dead_code))]
struct LoginRequest {
    email: String,
    password: String,
}

/// Login response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg(not(feature = "ssr"))]
struct LoginResponse {
    user: Principal,
    #[allow(dead_code)]
    expires_at: i64,
}

/// Login with email and password
#[cfg(not(feature = "ssr"))]
pub async fn login(ctx: AuthContext, email: &str, password: &str) -> Result<SessionUser, String> {
    use gloo_net::http::Request;

    ctx.loading.set(true);
    ctx.error.set(None);

    let request = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };

    let result = async {
        let response = Request::post("/api/auth/login")
            .header("Content-Type", "application/json")
            .json(&request)
            .map_err(|_| "Failed to send request".to_string())?
            .send()
            .await
            .map_err(|_| "Network error. Please try again.".to_string())?;

        if response.ok() {
            let body: LoginResponse = response.json().await.map_err(|e| e.to_string())?;
            Ok(SessionUser {
                id: body.user.id,
                role: body.user.role,
            })
        } else {
            let err: AuthApiError = response.json().await.map_err(|e| e.to_string())?;
            Err(err.error)
        }
    }
    .await;

    ctx.loading.set(false);

    match &result {
        Ok(user) => ctx.state.set(AuthState::Authenticated(user.clone())),
        Err(e) => ctx.error.set(Some(e.clone())),
    }

    result
}

#[cfg(feature = "ssr")]
pub async fn login(_ctx: AuthContext, _email: &str, _password: &str) -> Result<SessionUser, String> {
    Err("Login not available on server".to_string())
}

/// Sign out: drop the cookie, clear local state and go to the login page
#[cfg(not(feature = "ssr"))]
pub async fn logout(ctx: AuthContext, reason: Option<SignOutReason>) {
    use gloo_net::http::Request;

    if let Err(e) = Request::post("/api/auth/logout").send().await {
        leptos::logging::warn!("Logout request failed: {}", e);
    }

    // Clear local state regardless of API call result
    ctx.clear();
    navigate_to(&sign_out_target(reason));
}

#[cfg(feature = "ssr")]
pub async fn logout(_ctx: AuthContext, _reason: Option<SignOutReason>) {}

/// GET /api/auth/session
#[cfg(not(feature = "ssr"))]
pub async fn fetch_status() -> Result<SessionStatus, StatusCheckError> {
    use gloo_net::http::Request;

    let response = Request::get("/api/auth/session")
        .send()
        .await
        .map_err(|e| StatusCheckError::Network(e.to_string()))?;

    let body = response.json::<SessionStatus>().await.ok();
    status_from_response(response.status(), body)
}

/// Full page load, so the server-side gate sees the request
#[cfg(not(feature = "ssr"))]
pub fn navigate_to(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.location().set_href(url) {
            leptos::logging::error!("Navigation to {} failed: {:?}", url, e);
        }
    }
}

#[cfg(feature = "ssr")]
pub fn navigate_to(_url: &str) {}

#[cfg(not(feature = "ssr"))]
async fn restore_session(ctx: AuthContext) {
    use gloo_net::http::Request;

    let status = match fetch_status().await {
        Ok(status) if !status.is_terminal() => status,
        _ => {
            ctx.clear();
            return;
        }
    };

    let user = match Request::get("/api/admin/me").send().await {
        Ok(response) if response.ok() => response.json::<SessionUser>().await.ok(),
        _ => None,
    };

    match user {
        Some(user) => {
            ctx.status.set(Some(status));
            ctx.state.set(AuthState::Authenticated(user));
        }
        None => ctx.clear(),
    }
}
