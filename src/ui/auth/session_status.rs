//! Session countdown shown in the admin header

use leptos::prelude::*;

use super::context::use_auth_context;

#[component]
pub fn SessionStatusIndicator() -> impl IntoView {
    let auth = use_auth_context();

    view! {
        {move || {
            auth.status.get().map(|status| {
                let warn = status.time_remaining_minutes < 5;
                let text = if status.next_refresh_hint.starts_with("in ") {
                    format!("Session renews {}", status.next_refresh_hint)
                } else {
                    format!("Session: {}", status.next_refresh_hint)
                };
                view! {
                    <span
                        class="text-sm"
                        class:text-stone-500=!warn
                        class:text-amber-600=warn
                        title=format!("{} minutes left", status.time_remaining_minutes)
                    >
                        {text}
                    </span>
                }
            })
        }}
    }
}
