use clap::Parser;
use tokkatot_middleware::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so JWT_SECRET, REG_KEY, etc. can live next to the binary
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tokkatot_middleware=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = tokkatot_middleware::cli::run(cli).await {
        match std::env::var("TOKKATOT_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
