use anyhow::{bail, Context};

use crate::auth::{hash_password, validate_password, validate_username};
use crate::config::AppConfig;
use crate::database::Database;

pub const PASSWORD_ENV: &str = "TOKKATOT_PASSWORD";

/// Bootstrap an account from the shell, bypassing the registration key
pub async fn create(config: AppConfig, username: &str) -> anyhow::Result<()> {
    let password = std::env::var(PASSWORD_ENV)
        .with_context(|| format!("{} environment variable not set", PASSWORD_ENV))?;

    let db = Database::connect(&config.database).await?;
    let result = create_user(&db, &config, username, &password).await;
    db.close().await;

    let id = result?;
    println!("Created user {} (id {})", username, id);
    Ok(())
}

pub async fn create_user(
    db: &Database,
    config: &AppConfig,
    username: &str,
    password: &str,
) -> anyhow::Result<i64> {
    validate_username(username)?;
    validate_password(password, config.security.min_password_length)?;

    let users = db.users();
    if users.exists(username).await? {
        bail!("Username already taken");
    }

    let hashed = hash_password(password, config.security.bcrypt_cost).await?;
    let id = users.create(username, &hashed).await?;
    tracing::info!("Created user {} from the command line", username);
    Ok(id)
}
