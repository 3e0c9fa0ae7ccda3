//! Application pages module
//!
//! - Landing page (public)
//! - Admin login page
//! - Admin dashboard
//! - Not found page

mod admin;
mod landing;
mod login;
mod not_found;

pub use admin::AdminPage;
pub use landing::LandingPage;
pub use login::LoginPage;
pub use not_found::NotFoundPage;
