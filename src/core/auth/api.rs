//! Auth API endpoints
//!
//! Provides REST API endpoints for the admin session:
//! - POST /api/auth/login - Verify credentials and set the session cookie
//! - POST /api/auth/logout - Clear the session cookie
//! - GET /api/auth/session - Report the current session status

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use std::sync::Arc;

use super::cookies::SessionCookie;
use super::gate::RouteGuard;
use super::middleware::{AdminSession, MaybeSession};
use super::principal::Principal;
use super::service::{AuthError, AuthService, LoginRequest};
use super::session::{SessionStatus, SessionUser};

/// State shared by the auth routes and the session middleware
#[derive(Clone)]
pub struct AuthApiState {
    pub auth_service: AuthService,
    pub cookie: SessionCookie,
    pub guard: RouteGuard,
}

impl AuthApiState {
    pub fn new(auth_service: AuthService) -> Self {
        Self {
            auth_service,
            cookie: SessionCookie::default(),
            guard: RouteGuard::default(),
        }
    }

    pub fn cookie(mut self, cookie: SessionCookie) -> Self {
        self.cookie = cookie;
        self
    }

    pub fn guard(mut self, guard: RouteGuard) -> Self {
        self.guard = guard;
        self
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Convert AuthError to API response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::InvalidCredentials | AuthError::NotAuthorized => {
                (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
            }
            AuthError::RefreshAccessTokenError => {
                (StatusCode::UNAUTHORIZED, "REFRESH_ACCESS_TOKEN_ERROR")
            }
            AuthError::RefreshTokenExpired => (StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_EXPIRED"),
            AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            AuthError::InternalError(e) => {
                tracing::error!("Internal auth error: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiError::new("Internal server error", "INTERNAL_ERROR")),
                )
                    .into_response();
            }
        };

        let body = ApiError::new(self.to_string(), code);

        (status, Json(body)).into_response()
    }
}

/// Response for a successful login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: Principal,
    /// End of the first access window (Unix seconds)
    pub expires_at: i64,
}

/// Response for logout
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Create the auth API router
pub fn auth_api_router(state: AuthApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/session", get(session_handler))
        .route("/api/admin/me", get(admin_me_handler))
        .with_state(state)
}

/// POST /api/auth/login
/// Verify credentials and start a session
async fn login_handler(
    State(state): State<Arc<AuthApiState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AuthError> {
    tracing::info!("Login attempt for email: {}", request.email);

    let now = chrono::Utc::now().timestamp();
    let result = match state.auth_service.login(&request, now).await {
        Ok(result) => result,
        Err(e) => {
            match &e {
                AuthError::NotAuthorized => {
                    tracing::warn!("Login refused for non-admin account: {}", request.email)
                }
                AuthError::InternalError(_) => {}
                _ => tracing::info!("Login failed for email: {}", request.email),
            }
            return Err(e);
        }
    };

    tracing::info!("Admin logged in successfully: {}", result.principal.email);

    let cookie = state.cookie.build(result.encoded, &result.token, now);
    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            user: result.principal,
            expires_at: result.token.access_exp,
        }),
    ))
}

/// POST /api/auth/logout
/// Drop the session cookie
async fn logout_handler(
    State(state): State<Arc<AuthApiState>>,
    jar: CookieJar,
    MaybeSession(session): MaybeSession,
) -> (CookieJar, Json<LogoutResponse>) {
    match session {
        Some(s) => tracing::info!("Logout for user: {}", s.user.id),
        None => tracing::debug!("Logout without a session"),
    }

    (
        jar.add(state.cookie.clear()),
        Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// GET /api/auth/session
/// Current session status; 401 when there is no session or it has ended
async fn session_handler(MaybeSession(session): MaybeSession) -> (StatusCode, Json<SessionStatus>) {
    let status = session
        .map(|s| s.status())
        .unwrap_or_else(SessionStatus::unauthenticated);

    let code = if status.is_terminal() {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::OK
    };

    (code, Json(status))
}

/// GET /api/admin/me
/// Identity of the signed-in admin
async fn admin_me_handler(AdminSession(session): AdminSession) -> Json<SessionUser> {
    Json(session.user)
}
