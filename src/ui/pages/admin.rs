//! Admin dashboard
//!
//! Only reachable through the server-side gate. The client guard keeps
//! watching the session while the page is open.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::ui::auth::{AuthState, SessionGuard, SessionStatusIndicator, logout, use_auth_context};

#[component]
pub fn AdminPage() -> impl IntoView {
    let auth = use_auth_context();

    let on_sign_out = move |_| {
        spawn_local(async move {
            logout(auth, None).await;
        });
    };

    view! {
        <SessionGuard />
        <div class="min-h-screen bg-stone-50">
            <header class="bg-white border-b border-stone-200">
                <div class="max-w-5xl mx-auto px-4 h-16 flex items-center justify-between">
                    <span class="text-lg font-semibold text-stone-800">"Studio Admin"</span>
                    <div class="flex items-center gap-4">
                        <SessionStatusIndicator />
                        <button
                            class="px-3 py-1.5 text-sm border border-stone-300 rounded-lg hover:bg-stone-100"
                            on:click=on_sign_out
                        >
                            "Sign out"
                        </button>
                    </div>
                </div>
            </header>

            <main class="max-w-5xl mx-auto px-4 py-8">
                {move || match auth.state.get() {
                    AuthState::Loading => view! {
                        <p class="text-stone-500">"Checking your session..."</p>
                    }.into_any(),
                    AuthState::Unauthenticated => view! {
                        <p class="text-stone-500">"You are signed out."</p>
                    }.into_any(),
                    AuthState::Authenticated(user) => view! {
                        <div class="space-y-2">
                            <h1 class="text-2xl font-semibold text-stone-800">"Dashboard"</h1>
                            <p class="text-stone-600">
                                "Signed in as " {user.role.to_string()} " " <code>{user.id.to_string()}</code>
                            </p>
                        </div>
                    }.into_any(),
                }}
            </main>
        </div>
    }
}
