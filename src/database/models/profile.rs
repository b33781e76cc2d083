use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row from the `user_profiles` table, one per user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub phone_number: String,
    pub gender: String,
    pub province: String,
}

impl UserProfile {
    /// Placeholder returned before the user has saved anything
    pub fn empty(user_id: i64) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }
}

/// Editable profile fields accepted from clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub province: String,
}
