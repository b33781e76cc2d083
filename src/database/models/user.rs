use sqlx::FromRow;

/// Row from the `users` table. `password` holds the bcrypt hash.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
}
