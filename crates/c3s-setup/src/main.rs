use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use c3s_db::{schema, Connection};

#[derive(Parser, Debug)]
#[clap(name = "c3s-setup")]
struct Cli {
    #[clap(long, env = "C3S_MEMBERS_DB", default_value = "members.sqlite3")]
    pub members_db: String,

    #[clap(long, env = "C3S_LOG", default_value = "info")]
    pub log_level: String,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database and install the schema
    Init,
}

/// Initialize the database
async fn db_init(filename: &str) -> Result<()> {
    let conn = Connection::open(filename).await?;
    schema::install(&conn).await?;
    tracing::info!(filename, "database ready");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Command::Init => db_init(&cli.members_db).await?,
    }
    Ok(())
}
