//! Authentication for the Parish Portal
//!
//! Plain email/password sign-in against /auth/login; after that the api
//! client renews the access token transparently through /auth/refresh.

pub mod login;
pub mod session;
pub mod tokens;

pub use login::{login, logout, status};
pub use tokens::TokenStore;
