pub mod manager;
pub mod models;
pub mod repository;

pub use manager::{Database, DatabaseError};
pub use models::{ProfileUpdate, User, UserProfile};
pub use repository::{ProfileRepository, UserRepository};
