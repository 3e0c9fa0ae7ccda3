//! Admin login form

use leptos::prelude::*;
use leptos::task::spawn_local;

use super::context::{login, use_auth_context};

/// Login form component
#[component]
pub fn LoginForm(
    /// Callback when login is successful
    #[prop(optional, into)]
    on_success: Option<Callback<()>>,
) -> impl IntoView {
    let auth = use_auth_context();

    // Form state
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let form_error = RwSignal::new(None::<String>);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        auth.clear_error();

        let email_val = email.get();
        let password_val = password.get();

        if email_val.trim().is_empty() || password_val.is_empty() {
            form_error.set(Some("Email and password are required".to_string()));
            return;
        }
        form_error.set(None);

        spawn_local(async move {
            // Failures are reported through the auth context
            if login(auth, &email_val, &password_val).await.is_ok() {
                password.set(String::new());
                if let Some(callback) = on_success {
                    callback.run(());
                }
            }
        });
    };

    view! {
        <form on:submit=on_submit class="space-y-6">
            <div class="text-center">
                <h2 class="text-2xl font-bold text-stone-800">"Studio Admin"</h2>
                <p class="mt-2 text-sm text-stone-500">"Sign in to manage bookings and promotions"</p>
            </div>

            {move || {
                form_error.get().or_else(|| auth.error.get()).map(|error| {
                    view! {
                        <div class="p-3 bg-red-50 border border-red-200 rounded-lg" role="alert">
                            <p class="text-sm text-red-700">{error}</p>
                        </div>
                    }
                })
            }}

            <div>
                <label for="email" class="block text-sm font-medium text-stone-700 mb-1">"Email"</label>
                <input
                    type="email"
                    id="email"
                    name="email"
                    autocomplete="username"
                    class="w-full px-3 py-2 border border-stone-300 rounded-lg focus:outline-none focus:ring-2 focus:ring-rose-400"
                    prop:value=move || email.get()
                    on:input=move |ev| email.set(event_target_value(&ev))
                />
            </div>

            <div>
                <label for="password" class="block text-sm font-medium text-stone-700 mb-1">"Password"</label>
                <input
                    type="password"
                    id="password"
                    name="password"
                    autocomplete="current-password"
                    class="w-full px-3 py-2 border border-stone-300 rounded-lg focus:outline-none focus:ring-2 focus:ring-rose-400"
                    prop:value=move || password.get()
                    on:input=move |ev| password.set(event_target_value(&ev))
                />
            </div>

            <button
                type="submit"
                class="w-full py-2.5 px-4 bg-rose-500 hover:bg-rose-600 text-white font-medium rounded-lg disabled:opacity-50"
                disabled=move || auth.loading.get()
            >
                {move || if auth.loading.get() { "Signing in..." } else { "Sign In" }}
            </button>
        </form>
    }
}
