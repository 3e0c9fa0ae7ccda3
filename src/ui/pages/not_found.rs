//! Not found page component

use leptos::prelude::*;
use leptos_router::components::A;

/// Not found (404) page component
#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-stone-50 flex flex-col items-center justify-center p-4">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-stone-800 mb-4">"404"</h1>
                <h2 class="text-2xl font-semibold text-stone-800 mb-2">"Page Not Found"</h2>
                <p class="text-stone-600 mb-8 max-w-md mx-auto">
                    "The page you're looking for doesn't exist or has been moved."
                </p>
                <A
                    href="/"
                    attr:class="px-6 py-3 bg-rose-500 hover:bg-rose-600 text-white font-medium rounded-lg"
                >
                    "Go Home"
                </A>
            </div>
        </div>
    }
}
