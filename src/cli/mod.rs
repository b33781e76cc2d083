pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "tokkatot-middleware")]
#[command(about = "Tokkatot middleware - auth, profiles, IoT gateway proxy and disease detection")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, global = true, help = "SQLite database URL (overrides DATABASE_URL)")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Create a user without a registration key; password is read from TOKKATOT_PASSWORD")]
    CreateUser {
        #[arg(help = "Username for the new account")]
        username: String,
    },
}

impl Cli {
    /// Environment configuration with command-line overrides applied last
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::from_env();
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        config
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::handle(config).await,
        Commands::CreateUser { username } => commands::user::create(config, &username).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["tokkatot-middleware"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.port.is_none());
    }

    #[test]
    fn parses_overrides_and_create_user() {
        let cli = Cli::try_parse_from([
            "tokkatot-middleware",
            "--port",
            "8080",
            "--database-url",
            "sqlite://farm.db",
            "create-user",
            "dara",
        ])
        .unwrap();

        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.database_url.as_deref(), Some("sqlite://farm.db"));
        assert!(matches!(cli.command, Some(Commands::CreateUser { ref username }) if username == "dara"));

        let config = cli.config();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "sqlite://farm.db");
    }
}
