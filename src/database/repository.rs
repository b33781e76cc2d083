use sqlx::SqlitePool;

use crate::database::manager::DatabaseError;
use crate::database::models::{ProfileUpdate, User, UserProfile};

/// Queries against the `users` table
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, username: &str) -> Result<bool, DatabaseError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Insert a user and return the new row id.
    ///
    /// A concurrent registration of the same name surfaces as
    /// `DatabaseError::Conflict` rather than a raw SQL error.
    pub async fn create(&self, username: &str, password_hash: &str) -> Result<i64, DatabaseError> {
        let result = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    DatabaseError::Conflict(format!("username '{}'", username))
                }
                other => DatabaseError::Sqlx(other),
            })?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn id_for(&self, username: &str) -> Result<Option<i64>, DatabaseError> {
        let id = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }
}

/// Queries against the `user_profiles` table
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch a profile; users who never saved one get an empty profile
    pub async fn get(&self, user_id: i64) -> Result<UserProfile, DatabaseError> {
        let query = r#"
            SELECT
                id, user_id,
                COALESCE(full_name, '') AS full_name,
                COALESCE(phone_number, '') AS phone_number,
                COALESCE(gender, '') AS gender,
                COALESCE(province, '') AS province
            FROM user_profiles
            WHERE user_id = ?
        "#;

        let profile = sqlx::query_as::<_, UserProfile>(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile.unwrap_or_else(|| UserProfile::empty(user_id)))
    }

    /// Insert or replace the profile for `user_id`, keeping one row per user
    pub async fn upsert(&self, user_id: i64, update: &ProfileUpdate) -> Result<(), DatabaseError> {
        let query = r#"
            INSERT INTO user_profiles (user_id, full_name, phone_number, gender, province)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                full_name = excluded.full_name,
                phone_number = excluded.phone_number,
                gender = excluded.gender,
                province = excluded.province
        "#;

        sqlx::query(query)
            .bind(user_id)
            .bind(&update.full_name)
            .bind(&update.phone_number)
            .bind(&update.gender)
            .bind(&update.province)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
