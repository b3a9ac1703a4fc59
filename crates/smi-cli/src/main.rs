use anyhow::Result;
use clap::{Parser, Subcommand};
use smi_db::{connect_pool, ensure_tables, DbConfig, SchemaCaps};

#[derive(Debug, Parser)]
#[command(name = "smi-cli")]
#[command(about = "SME investment platform command-line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the JSON API server.
    Serve,
    /// Create any missing tables and indexes.
    Migrate,
    /// Print the schema capabilities resolved from the live database.
    Probe,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => smi_web::serve_from_env().await?,
        Commands::Migrate => {
            let config = DbConfig::from_env();
            let pool = connect_pool(&config)?;
            ensure_tables(&pool).await?;
            println!("schema ensured");
        }
        Commands::Probe => {
            let config = DbConfig::from_env();
            let pool = connect_pool(&config)?;
            let caps = SchemaCaps::resolve(&pool).await?;
            println!(
                "investment_opportunities id column: {}",
                caps.sme_opportunity_id.unwrap_or("<missing>")
            );
            println!(
                "investment_opportunities sme fk column: {}",
                caps.sme_opportunity_fk.unwrap_or("<missing>")
            );
        }
    }

    Ok(())
}
