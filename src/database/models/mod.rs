pub mod profile;
pub mod user;

pub use profile::{ProfileUpdate, UserProfile};
pub use user::User;
