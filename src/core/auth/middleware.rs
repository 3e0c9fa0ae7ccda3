//! Per-request session resolution and route gating
//!
//! [`session_middleware`] runs on every request: it decodes the session
//! cookie, lets the refresh engine renew or reject it, writes a changed token
//! back, stores the resulting [`Session`] in the request extensions and then
//! applies the [`RouteGuard`](super::gate::RouteGuard).

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use super::api::AuthApiState;
use super::gate::GateDecision;
use super::service::AuthError;
use super::session::Session;

pub async fn session_middleware(
    State(state): State<Arc<AuthApiState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let now = chrono::Utc::now().timestamp();
    let mut jar = jar;

    let session = match state.cookie.read(&jar) {
        None => None,
        Some(raw) => match state.auth_service.resolve(&raw, now).await {
            Ok(resolved) => {
                if let Some(encoded) = resolved.reissued {
                    jar = jar.add(state.cookie.build(encoded, resolved.outcome.token(), now));
                }
                Some(resolved.session)
            }
            Err(e) => {
                tracing::debug!("Discarding unreadable session cookie: {}", e);
                jar = jar.add(state.cookie.clear());
                None
            }
        },
    };

    let path = request.uri().path().to_string();
    if let GateDecision::Redirect(reason) = state.guard.decide(&path, session.as_ref()) {
        tracing::debug!("Gate redirect for {}: {}", path, reason);
        let location = state.guard.redirect_location(reason);
        return (jar, Redirect::to(&location)).into_response();
    }

    if let Some(session) = session {
        request.extensions_mut().insert(session);
    }

    let response = next.run(request).await;

    // A handler that set the session cookie itself (login, logout) wins
    let handled = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| state.cookie.is_set_by(v));

    if handled {
        response
    } else {
        (jar, response).into_response()
    }
}

/// Session resolved by [`session_middleware`], if any
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(parts.extensions.get::<Session>().cloned()))
    }
}

/// Valid admin session, for handlers behind the protected prefixes
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)?;

        if let Some(error) = session.error {
            return Err(error.into());
        }
        if !session.is_valid() || !session.is_admin() {
            return Err(AuthError::Unauthenticated);
        }

        Ok(AdminSession(session))
    }
}
