//! Public landing page

use leptos::prelude::*;
use leptos_router::components::A;

#[component]
pub fn LandingPage() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-stone-50 flex flex-col items-center justify-center p-4 text-center">
            <h1 class="text-4xl font-semibold text-stone-800 mb-4">"Ever After Studio"</h1>
            <p class="text-stone-600 mb-8 max-w-md">
                "Wedding planning, styling and photography for your day."
            </p>
            <A href="/admin/login" attr:class="text-sm text-stone-400 hover:text-stone-600">
                "Staff sign in"
            </A>
        </div>
    }
}
