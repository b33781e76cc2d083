// handlers/protected/mod.rs - routes behind the session cookie (`require_auth`)

pub mod ai;
pub mod iot;
pub mod profile;

pub use ai::{ai_health, disease_info, predict_disease};
pub use profile::{get_profile, update_profile};
