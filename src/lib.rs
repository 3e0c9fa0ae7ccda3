//! Wedding studio admin
//!
//! Session lifecycle for the studio's admin area: credential login, signed
//! session cookies with transparent renewal, route gating and a client-side
//! guard, served with Leptos on axum.

#![recursion_limit = "256"]

pub mod app;
pub mod core;
pub mod ui;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
