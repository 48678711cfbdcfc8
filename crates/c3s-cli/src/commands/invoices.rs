use anyhow::Result;
use chrono::Datelike;
use clap::{Args, Subcommand};

use c3s_accounting::{datetime, DuesInvoiceRepository};
use c3s_db::Connection;

use crate::formatting::{print_json, PrintFormatted};

#[derive(Subcommand, Debug)]
pub enum Invoices {
    /// List the dues invoices of a year
    #[clap(name = "list")]
    List(ListInvoices),
    /// Show a single invoice
    #[clap(name = "show")]
    Show(ShowInvoice),
    /// Monthly invoice and payment totals
    #[clap(name = "stats")]
    Stats(InvoiceStats),
}

impl Invoices {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Invoices::List(cmd) => cmd.run(db).await,
            Invoices::Show(cmd) => cmd.run(db).await,
            Invoices::Stats(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListInvoices {
    #[clap(short, long, default_value_t = datetime::today().year())]
    pub year: i32,
    /// Only invoices of this member
    #[clap(short, long)]
    pub member: Option<u32>,
    /// Only reversal invoices
    #[clap(long, conflicts_with = "member")]
    pub reversals: bool,
    #[clap(long)]
    pub json: bool,
}

impl ListInvoices {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let repo = DuesInvoiceRepository::new(db);
        let invoices = match self.member {
            Some(member_id) => repo.get_by_member(self.year, member_id).await?,
            None if self.reversals => repo.get_reversals(self.year).await?,
            None => repo.get_all(self.year).await?,
        };
        if self.json {
            return print_json(&invoices);
        }
        println!("{} invoices.", invoices.len());
        invoices.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ShowInvoice {
    #[clap(short, long, default_value_t = datetime::today().year())]
    pub year: i32,
    #[clap(short, long)]
    pub number: u32,
    #[clap(long)]
    pub json: bool,
}

impl ShowInvoice {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let invoice = DuesInvoiceRepository::new(db)
            .get_by_number(self.year, self.number)
            .await?;
        if self.json {
            return print_json(&invoice);
        }
        println!();
        invoice.print_formatted();
        println!();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct InvoiceStats {
    #[clap(short, long, default_value_t = datetime::today().year())]
    pub year: i32,
}

impl InvoiceStats {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let stats = DuesInvoiceRepository::new(db)
            .get_monthly_stats(self.year)
            .await?;
        stats.print_formatted();
        Ok(())
    }
}
