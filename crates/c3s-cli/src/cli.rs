use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::commands::{Assembly, Dues, Invoices, Members};

#[derive(Parser, Debug)]
#[clap(name = "c3s", version=env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Path of the members database
    #[clap(long, env = "C3S_MEMBERS_DB", default_value = "members.sqlite3")]
    pub members_db: String,

    /// Log filter, e.g. `info` or `c3s_accounting=debug`
    #[clap(long, env = "C3S_LOG", default_value = "warn")]
    pub log_level: String,

    /// Dues for a membership over the full year
    #[clap(long, env = "C3S_ANNUAL_DUES", default_value = "50")]
    pub annual_dues: Decimal,

    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn init() -> Self {
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage applications and members
    #[clap(subcommand)]
    Members(Members),

    /// Invoice, reduce and settle membership dues
    #[clap(subcommand)]
    Dues(Dues),

    /// Inspect dues invoices
    #[clap(subcommand)]
    Invoices(Invoices),

    /// Manage general assemblies and invitations
    #[clap(subcommand)]
    Assembly(Assembly),
}
