//! Ridelens - main entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ridelens::{
    cli::{Cli, Command, run_doctor_command},
    config::{Config, DatabaseConfig},
    db,
    web::WebChannel,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ridelens=info,tower_http=info")),
        )
        .init();

    match cli.command {
        Some(Command::Load) => {
            let config = DatabaseConfig::resolve()?;
            let report = db::load(&config).await?;
            for (table, rows) in &report.tables {
                println!("{table}: {rows} rows");
            }
            println!("Database created at {}", config.path.display());
            Ok(())
        }
        Some(Command::Doctor) => {
            let config = DatabaseConfig::resolve()?;
            run_doctor_command(&config)
        }
        None | Some(Command::Run) => {
            // Fails fast here when the API credential is absent.
            let config = Config::from_env()?;

            if !config.database.path.exists() {
                tracing::warn!(
                    "database not found at {} - run `ridelens load` first",
                    config.database.path.display()
                );
            }

            tracing::info!(model = %config.llm.model, "starting ridelens");
            WebChannel::new(config).serve().await?;
            Ok(())
        }
    }
}
