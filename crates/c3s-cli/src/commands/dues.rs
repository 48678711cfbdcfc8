use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Args, Subcommand};
use inquire::Confirm;
use rust_decimal::Decimal;

use c3s_accounting::{
    datetime, invoicing::issue_dues_invoice, payment::record_dues_payment,
    reduction::reduce_dues, DuesError, DuesSchedule,
};
use c3s_data::{Dues as DuesRecord, DuesFilter, Member, MemberFilter, Query, Retrieve};
use c3s_db::Connection;

use crate::formatting::{print_json, PrintFormatted};

#[derive(Subcommand, Debug)]
pub enum Dues {
    /// Issue dues invoices for a year
    #[clap(name = "invoice")]
    Invoice(InvoiceDues),
    /// Reduce the dues of a member
    #[clap(name = "reduce")]
    Reduce(ReduceDues),
    /// Record a dues payment
    #[clap(name = "pay")]
    Pay(PayDues),
    /// Show the dues of a year
    #[clap(name = "show")]
    Show(ShowDues),
}

impl Dues {
    pub async fn run(self, db: &Connection, schedule: &DuesSchedule) -> Result<()> {
        match self {
            Dues::Invoice(cmd) => cmd.run(db, schedule).await,
            Dues::Reduce(cmd) => cmd.run(db).await,
            Dues::Pay(cmd) => cmd.run(db).await,
            Dues::Show(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct InvoiceDues {
    /// Only invoice this member, all members otherwise
    #[clap(short, long)]
    pub id: Option<u32>,
    #[clap(short, long, default_value_t = datetime::today().year())]
    pub year: i32,
    #[clap(short, long, default_value_t = datetime::today())]
    pub date: NaiveDate,
}

impl InvoiceDues {
    /// Run the command and invoice the dues
    pub async fn run(self, db: &Connection, schedule: &DuesSchedule) -> Result<()> {
        if let Some(id) = self.id {
            let member: Member = db.retrieve(id).await?;
            let (dues, invoice) = issue_dues_invoice(db, &member, self.year, schedule, self.date)
                .await?;
            println!(
                "{}: {} over {:.2} (since {})",
                member.full_name(),
                invoice.invoice_no_string,
                invoice.invoice_amount,
                dues.start
            );
            return Ok(());
        }

        let message = format!("Issue dues invoices {} for all members?", self.year);
        let confirm = Confirm::new(&message).with_default(false);
        if !confirm.prompt()? {
            return Ok(());
        }

        let members: Vec<Member> = db
            .query(&MemberFilter {
                membership_accepted: Some(true),
                ..Default::default()
            })
            .await?;
        let mut issued = 0;
        for member in members {
            match issue_dues_invoice(db, &member, self.year, schedule, self.date).await {
                Ok((_, invoice)) => {
                    println!(
                        "{}: {} over {:.2}",
                        member.full_name(),
                        invoice.invoice_no_string,
                        invoice.invoice_amount
                    );
                    issued += 1;
                }
                Err(DuesError::AlreadyInvoiced(..))
                | Err(DuesError::NotAMember(..))
                | Err(DuesError::NotApplicable(..)) => {}
                Err(err) => return Err(err.into()),
            }
        }
        println!("{} invoices issued.", issued);

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ReduceDues {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long, default_value_t = datetime::today().year())]
    pub year: i32,
    /// The new amount of the year's dues
    #[clap(short, long)]
    pub amount: Decimal,
    #[clap(short, long, default_value_t = datetime::today())]
    pub date: NaiveDate,
}

impl ReduceDues {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let member: Member = db.retrieve(self.id).await?;
        let message = format!(
            "Reduce dues {} of {} to {:.2}?",
            self.year,
            member.full_name(),
            self.amount
        );
        let confirmed = Confirm::new(&message).with_default(false).prompt()?;
        if !confirmed {
            return Ok(());
        }

        let reduction =
            reduce_dues(db, &member, self.year, self.amount, confirmed, self.date).await?;
        println!("Cancelled:\t{}", reduction.cancelled.invoice_no_string);
        println!("Reversal:\t{}", reduction.reversal.invoice_no_string);
        if let Some(invoice) = reduction.invoice {
            println!("New Invoice:\t{}", invoice.invoice_no_string);
        }
        println!("Balance:\t{:.2}", reduction.dues.balance);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct PayDues {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long, default_value_t = datetime::today().year())]
    pub year: i32,
    #[clap(short, long)]
    pub amount: Decimal,
    #[clap(short, long, default_value_t = datetime::today())]
    pub date: NaiveDate,
}

impl PayDues {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let dues = record_dues_payment(db, self.id, self.year, self.amount, self.date).await?;
        println!(
            "Paid {:.2} in total, balance {:.2}.",
            dues.amount_paid, dues.balance
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ShowDues {
    #[clap(short, long)]
    pub id: Option<u32>,
    #[clap(short, long, default_value_t = datetime::today().year())]
    pub year: i32,
    /// Only paid (`true`) or unpaid (`false`) dues
    #[clap(short, long)]
    pub paid: Option<bool>,
    #[clap(long)]
    pub json: bool,
}

impl ShowDues {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let dues: Vec<DuesRecord> = db
            .query(&DuesFilter {
                member_id: self.id,
                year: Some(self.year),
                paid: self.paid,
            })
            .await?;
        if self.json {
            return print_json(&dues);
        }
        if dues.is_empty() {
            return Err(anyhow!("No dues recorded for {}.", self.year));
        }
        for dues in dues {
            let member: Member = db.retrieve(dues.member_id).await?;
            println!("{}", member.full_name());
            dues.print_formatted();
            println!();
        }
        Ok(())
    }
}
