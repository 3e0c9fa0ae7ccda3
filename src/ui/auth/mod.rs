//! Authentication UI module
//!
//! Login form, auth context and the components that keep an admin session
//! in sync with the server.

mod context;
mod login_form;
mod session_guard;
mod session_status;

pub use context::{
    AuthContext, AuthState, logout, navigate_to, provide_auth_context, sign_out_target,
    use_auth_context,
};
pub use login_form::LoginForm;
pub use session_guard::SessionGuard;
pub use session_status::SessionStatusIndicator;
