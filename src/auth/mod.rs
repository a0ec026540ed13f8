//! Authentication session for the expense tracker client
//!
//! This module owns "who is logged in": login/signup against the custom
//! email/password endpoints, verification of a cached session on startup,
//! logout, and the reaction to session-expiry notifications raised by the
//! response pipeline.

mod core;
mod credentials;
mod token_management;

pub use self::core::AuthSession;
pub use credentials::{DEFAULT_LOGIN_ERROR, DEFAULT_SIGNUP_ERROR, LoginOutcome};

pub(crate) const ME_PATH: &str = "/api/me";
pub(crate) const LOGIN_PATH: &str = "/api/auth/login";
pub(crate) const SIGNUP_PATH: &str = "/api/auth/signup";
