pub mod ai;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod iot;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod ws;

pub use config::AppConfig;
pub use database::Database;
pub use routes::app;
pub use state::AppState;
