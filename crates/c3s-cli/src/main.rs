use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use c3s_accounting::DuesSchedule;
use c3s_cli::cli::{Cli, Command};
use c3s_db::Connection;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::init();
    init_logging(&cli.log_level);

    let conn = Connection::open(&cli.members_db).await?;
    let schedule = DuesSchedule::new(cli.annual_dues);
    match cli.command {
        Command::Members(cmd) => cmd.run(&conn).await,
        Command::Dues(cmd) => cmd.run(&conn, &schedule).await,
        Command::Invoices(cmd) => cmd.run(&conn).await,
        Command::Assembly(cmd) => cmd.run(&conn).await,
    }?;

    Ok(())
}
