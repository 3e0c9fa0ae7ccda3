pub mod auth;
pub mod pages;

pub use pages::{AdminPage, LandingPage, LoginPage, NotFoundPage};
