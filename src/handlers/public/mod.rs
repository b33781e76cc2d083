// handlers/public/mod.rs - routes reachable without a session cookie

pub mod auth;
pub mod form;
pub mod health;

pub use auth::{login, logout, register};
pub use form::FormFields;
pub use health::{health, root};
