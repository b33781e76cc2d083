use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// AES-256 key length for gateway payloads
pub const IOT_KEY_LEN: usize = 32;

/// Ten years
pub const MAX_TOKEN_EXPIRY_HOURS: u64 = 10 * 365 * 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub iot: IotConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    #[serde(skip_serializing)]
    pub registration_key: String,
    pub token_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub min_password_length: usize,
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IotConfig {
    pub gateway_url: String,
    /// Falls back to the JWT secret when unset
    #[serde(skip_serializing)]
    pub encryption_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub service_url: String,
    pub timeout_secs: u64,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("IoT encryption key must be 32 bytes (or 64 hex chars), got {0} bytes")]
    InvalidKeyLength(usize),

    #[error("Invalid URL for {name}: {reason}")]
    InvalidUrl { name: &'static str, reason: String },

    #[error("token expiry must be between 1 and {max} hours, got {0}", max = MAX_TOKEN_EXPIRY_HOURS)]
    InvalidTokenExpiry(u64),

    #[error("bcrypt cost must be between 4 and 31, got {0}")]
    InvalidBcryptCost(u32),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(v) = env::var("TOKKATOT_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("REG_KEY") {
            self.security.registration_key = v;
        }
        if let Ok(v) = env::var("TOKEN_EXPIRY_HOURS") {
            self.security.token_expiry_hours = v.parse().unwrap_or(self.security.token_expiry_hours);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // IoT gateway overrides
        if let Ok(v) = env::var("IOT_DATA_PROVIDER_URL") {
            self.iot.gateway_url = v;
        }
        if let Ok(v) = env::var("IOT_ENCRYPTION_KEY") {
            self.iot.encryption_key = Some(v);
        }
        if let Ok(v) = env::var("IOT_TIMEOUT_SECS") {
            self.iot.timeout_secs = v.parse().unwrap_or(self.iot.timeout_secs);
        }

        // AI service overrides
        if let Ok(v) = env::var("AI_SERVICE_URL") {
            self.ai.service_url = v;
        }
        if let Ok(v) = env::var("AI_TIMEOUT_SECS") {
            self.ai.timeout_secs = v.parse().unwrap_or(self.ai.timeout_secs);
        }
        if let Ok(v) = env::var("AI_MAX_UPLOAD_BYTES") {
            self.ai.max_upload_bytes = v.parse().unwrap_or(self.ai.max_upload_bytes);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: "sqlite://users.db".to_string(),
                max_connections: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                registration_key: String::new(),
                token_expiry_hours: 6 * 30 * 24, // 6 months
                bcrypt_cost: bcrypt::DEFAULT_COST,
                min_password_length: 8,
                cookie_secure: false,
                cors_origins: vec![],
            },
            iot: IotConfig {
                gateway_url: "http://10.0.0.2".to_string(),
                encryption_key: None,
                timeout_secs: 10,
            },
            ai: AiConfig {
                service_url: "http://10.0.0.1:5000".to_string(),
                timeout_secs: 30,
                max_upload_bytes: 10 * 1024 * 1024, // 10MB
            },
        }
    }

    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 10;
        config.security.cookie_secure = true;
        config
    }

    /// Check everything the server needs before it binds a port
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.security.registration_key.is_empty() {
            return Err(ConfigError::Missing("REG_KEY"));
        }
        if !(1..=MAX_TOKEN_EXPIRY_HOURS).contains(&self.security.token_expiry_hours) {
            return Err(ConfigError::InvalidTokenExpiry(self.security.token_expiry_hours));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::InvalidBcryptCost(self.security.bcrypt_cost));
        }
        self.iot_key()?;
        check_url("IOT_DATA_PROVIDER_URL", &self.iot.gateway_url)?;
        check_url("AI_SERVICE_URL", &self.ai.service_url)?;
        Ok(())
    }

    /// Resolve the AES-256 key shared with the IoT gateway.
    ///
    /// Accepts either 64 hex characters or exactly 32 raw bytes. When no
    /// dedicated key is configured the JWT secret is used, which is what the
    /// gateway firmware is provisioned with.
    pub fn iot_key(&self) -> Result<[u8; IOT_KEY_LEN], ConfigError> {
        let material = self
            .iot
            .encryption_key
            .as_deref()
            .unwrap_or(&self.security.jwt_secret);
        parse_key(material)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn parse_key(material: &str) -> Result<[u8; IOT_KEY_LEN], ConfigError> {
    if material.len() == IOT_KEY_LEN * 2 {
        if let Ok(decoded) = hex::decode(material) {
            let mut key = [0u8; IOT_KEY_LEN];
            key.copy_from_slice(&decoded);
            return Ok(key);
        }
    }

    let bytes = material.as_bytes();
    if bytes.len() != IOT_KEY_LEN {
        return Err(ConfigError::InvalidKeyLength(bytes.len()));
    }
    let mut key = [0u8; IOT_KEY_LEN];
    key.copy_from_slice(bytes);
    Ok(key)
}

fn check_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = url::Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        name,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            name,
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
