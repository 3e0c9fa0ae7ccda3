//! Admin login page
//!
//! Shows why the visitor was sent here (`?error=session_expired` or
//! `?error=unauthorized`) and moves on to the dashboard after sign-in.

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_query_map;

use crate::core::auth::SignOutReason;
use crate::ui::auth::{AuthState, LoginForm, navigate_to, use_auth_context};

const DASHBOARD_PATH: &str = "/admin";

/// Login page component
#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth_context();
    let query = use_query_map();

    let reason = move || {
        query
            .with(|q| q.get("error"))
            .and_then(|value| SignOutReason::from_query(&value))
    };

    // Already signed in
    Effect::new(move |_| {
        if matches!(auth.state.get(), AuthState::Authenticated(_)) {
            navigate_to(DASHBOARD_PATH);
        }
    });

    let on_success = move |_| navigate_to(DASHBOARD_PATH);

    view! {
        <div class="min-h-screen bg-stone-50 flex flex-col">
            <header class="border-b border-stone-200">
                <div class="max-w-5xl mx-auto px-4 h-16 flex items-center">
                    <A href="/" attr:class="text-xl font-semibold text-stone-800">"Ever After Studio"</A>
                </div>
            </header>

            <main class="flex-1 flex items-center justify-center p-4">
                <div class="w-full max-w-md bg-white rounded-xl shadow p-6 space-y-4">
                    {move || {
                        reason().map(|reason| {
                            view! {
                                <div class="p-3 bg-amber-50 border border-amber-200 rounded-lg">
                                    <p class="text-sm text-amber-800">{reason.message()}</p>
                                </div>
                            }
                        })
                    }}
                    <LoginForm on_success=Callback::new(on_success) />
                </div>
            </main>
        </div>
    }
}
