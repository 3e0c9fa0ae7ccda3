//! Client-side session guard
//!
//! Polls the status endpoint while a session exists and ends the session on
//! the client as soon as the server reports it terminal. The loop knows
//! nothing about the browser: the status source and the timer are injected,
//! and it is stopped by dropping its [`GuardHandle`].

use std::future::Future;
use std::time::Duration;

use futures::channel::oneshot;
use futures::future::{Either, select};
use futures::pin_mut;

use super::session::{SessionStatus, SignOutReason};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusCheckError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected status response: {0}")]
    Unexpected(String),
}

/// Where the guard gets the session status from
pub trait StatusSource {
    fn check(&self) -> impl Future<Output = Result<SessionStatus, StatusCheckError>>;
}

/// Timer used between checks
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Interpret a status endpoint answer.
///
/// A 401 is a terminal status even when the body is missing or unreadable.
pub fn status_from_response(
    http_status: u16,
    body: Option<SessionStatus>,
) -> Result<SessionStatus, StatusCheckError> {
    match http_status {
        200 => body.ok_or_else(|| StatusCheckError::Unexpected("empty body".to_string())),
        401 => Ok(body
            .filter(SessionStatus::is_terminal)
            .unwrap_or_else(SessionStatus::unauthenticated)),
        other => Err(StatusCheckError::Unexpected(format!("HTTP {other}"))),
    }
}

/// How the guard loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardExit {
    /// The server reported the session terminal
    SignOut(SignOutReason),
    /// The handle was dropped
    Stopped,
}

/// Owning side of a running guard; dropping it stops the loop
#[derive(Debug)]
pub struct GuardHandle {
    stop: Option<oneshot::Sender<()>>,
}

impl GuardHandle {
    /// Stop the loop now instead of at end of scope
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for GuardHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
    }
}

/// Receiving side handed to [`run_guard`]
#[derive(Debug)]
pub struct StopSignal(oneshot::Receiver<()>);

pub fn guard_channel() -> (GuardHandle, StopSignal) {
    let (tx, rx) = oneshot::channel();
    (GuardHandle { stop: Some(tx) }, StopSignal(rx))
}

/// Check immediately, then once per `interval`, until the session turns
/// terminal or the handle is dropped.
///
/// Checks run one after another, so there is never more than one request in
/// flight. A failed check is logged and retried on the next tick.
pub async fn run_guard<S, T>(
    source: &S,
    timer: &T,
    interval: Duration,
    stop: StopSignal,
) -> GuardExit
where
    S: StatusSource,
    T: Sleeper,
{
    let mut stop = stop.0;

    loop {
        let check = source.check();
        pin_mut!(check);

        match select(&mut stop, check).await {
            Either::Left(_) => return GuardExit::Stopped,
            Either::Right((Ok(status), _)) if status.is_terminal() => {
                return GuardExit::SignOut(SignOutReason::SessionExpired);
            }
            Either::Right((Ok(_), _)) => {}
            Either::Right((Err(e), _)) => {
                leptos::logging::warn!("Session status check failed: {}", e);
            }
        }

        let tick = timer.sleep(interval);
        pin_mut!(tick);

        if let Either::Left(_) = select(&mut stop, tick).await {
            return GuardExit::Stopped;
        }
    }
}
