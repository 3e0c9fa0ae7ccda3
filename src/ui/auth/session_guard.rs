//! Browser side of the session guard
//!
//! Starts the status poll loop while an admin session exists and stops it
//! when the session goes away or the component unmounts.

use leptos::prelude::*;

#[cfg(not(feature = "ssr"))]
use super::context::{AuthContext, fetch_status, logout, use_auth_context};
#[cfg(not(feature = "ssr"))]
use crate::core::auth::{
    DEFAULT_POLL_INTERVAL, GuardExit, GuardHandle, SessionStatus, Sleeper, StatusCheckError,
    StatusSource, guard_channel, run_guard,
};

/// Status source backed by the session endpoint; successful answers also
/// feed the countdown
#[cfg(not(feature = "ssr"))]
struct HttpStatusSource {
    ctx: AuthContext,
}

#[cfg(not(feature = "ssr"))]
impl StatusSource for HttpStatusSource {
    fn check(&self) -> impl std::future::Future<Output = Result<SessionStatus, StatusCheckError>> {
        let status = self.ctx.status;
        async move {
            let result = fetch_status().await;
            if let Ok(current) = &result {
                status.set(Some(current.clone()));
            }
            result
        }
    }
}

#[cfg(not(feature = "ssr"))]
struct BrowserSleeper;

#[cfg(not(feature = "ssr"))]
impl Sleeper for BrowserSleeper {
    fn sleep(&self, duration: std::time::Duration) -> impl std::future::Future<Output = ()> {
        gloo_timers::future::sleep(duration)
    }
}

/// Keeps the session status fresh and signs out once the server ends it.
/// Renders nothing.
#[component]
pub fn SessionGuard() -> impl IntoView {
    #[cfg(not(feature = "ssr"))]
    {
        use leptos::task::spawn_local;

        let auth = use_auth_context();
        let handle = StoredValue::new(None::<GuardHandle>);

        Effect::new(move |_| {
            if !auth.is_authenticated() {
                // Dropping the handle stops the loop
                handle.set_value(None);
                return;
            }
            if handle.with_value(Option::is_some) {
                return;
            }

            let (guard, stop) = guard_channel();
            handle.set_value(Some(guard));

            spawn_local(async move {
                let source = HttpStatusSource { ctx: auth };
                let exit = run_guard(&source, &BrowserSleeper, DEFAULT_POLL_INTERVAL, stop).await;

                if let GuardExit::SignOut(reason) = exit {
                    leptos::logging::log!("Session ended by the server, signing out");
                    logout(auth, Some(reason)).await;
                }
            });
        });

        on_cleanup(move || handle.set_value(None));
    }
}
