use std::sync::Arc;

use crate::ai::AiClient;
use crate::auth::TokenSigner;
use crate::config::{AppConfig, ConfigError};
use crate::database::Database;
use crate::iot::{GatewayClient, PayloadKey};
use crate::ws::ClientRegistry;

/// Everything a handler needs, built once at startup
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Database,
    pub tokens: TokenSigner,
    pub gateway: GatewayClient,
    pub ai: AiClient,
    pub clients: ClientRegistry,
}

impl AppState {
    pub fn build(config: AppConfig, db: Database) -> Result<Self, ConfigError> {
        let tokens = TokenSigner::new(
            &config.security.jwt_secret,
            config.security.token_expiry_hours,
        );
        let gateway = GatewayClient::new(&config.iot, PayloadKey::new(config.iot_key()?))?;
        let ai = AiClient::new(&config.ai)?;

        Ok(Self {
            config: Arc::new(config),
            db,
            tokens,
            gateway,
            ai,
            clients: ClientRegistry::new(),
        })
    }
}
