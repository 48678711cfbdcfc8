use anyhow::Result;
use serde::Serialize;

use c3s_accounting::{datetime, MonthlyStats};
use c3s_data::{Dues, DuesInvoice, GeneralAssembly, Invitation, Member, Shares};

macro_rules! next_attr {
    ($old:ident, $new:ident) => {
        if $old != $new {
            format!(" -> {}", $new)
        } else {
            "".to_string()
        }
    };
    ($old:ident, $new:ident, $attr:ident) => {
        if $old.$attr != $new.$attr {
            format!(" -> {}", $new.$attr)
        } else {
            "".to_string()
        }
    };
}

fn or_none<T: ToString>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}

pub trait PrintFormatted {
    fn print_formatted(&self);
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl PrintFormatted for Member {
    fn print_formatted(&self) {
        let today = datetime::today();
        println!("Name:\t\t\t{}", self.full_name());
        println!("Email:\t\t\t{}", self.email);
        println!("Address:\t\t{} {}", self.address1, self.address2);
        println!("\t\t\t{} {} {}", self.postcode, self.city, self.country);
        println!("Date of Birth:\t\t{}", or_none(self.date_of_birth));
        println!("Notes:\t\t\t{}", self.notes);
        println!("Submitted:\t\t{}", self.date_of_submission);
        println!(
            "Type:\t\t\t{}{}",
            self.membership_type,
            if self.is_legalentity { " (legal entity)" } else { "" }
        );
        println!("Shares:\t\t\t{}", self.num_shares);
        println!(
            "Signature:\t\t{}\t({})",
            self.signature_received,
            or_none(self.signature_received_date)
        );
        println!(
            "Payment:\t\t{}\t({})",
            self.payment_received,
            or_none(self.payment_received_date)
        );
        println!("Accepted:\t\t{}", self.membership_accepted);
        println!("Membership Number:\t{}", or_none(self.membership_number));
        println!("Membership Date:\t{}", or_none(self.membership_date));
        println!(
            "Membership Loss:\t{}\t({})",
            or_none(self.membership_loss_date),
            or_none(self.membership_loss_type)
        );
        println!("Member Today:\t\t{}", self.is_member(today));
    }
}

impl PrintFormatted for (Member, Member) {
    fn print_formatted(&self) {
        let (old, new) = self;

        let next_firstname = next_attr!(old, new, firstname);
        println!("First Name:\t\t{}{}", old.firstname, next_firstname);
        let next_lastname = next_attr!(old, new, lastname);
        println!("Last Name:\t\t{}{}", old.lastname, next_lastname);
        let next_email = next_attr!(old, new, email);
        println!("Email:\t\t\t{}{}", old.email, next_email);
        let next_address1 = next_attr!(old, new, address1);
        println!("Address:\t\t{}{}", old.address1, next_address1);
        let next_address2 = next_attr!(old, new, address2);
        println!("\t\t\t{}{}", old.address2, next_address2);
        let next_postcode = next_attr!(old, new, postcode);
        println!("Postcode:\t\t{}{}", old.postcode, next_postcode);
        let next_city = next_attr!(old, new, city);
        println!("City:\t\t\t{}{}", old.city, next_city);
        let next_country = next_attr!(old, new, country);
        println!("Country:\t\t{}{}", old.country, next_country);
        let next_locale = next_attr!(old, new, locale);
        println!("Locale:\t\t\t{}{}", old.locale, next_locale);
        let next_notes = next_attr!(old, new, notes);
        println!("Notes:\t\t\t{}{}", old.notes, next_notes);
    }
}

impl PrintFormatted for Vec<Member> {
    fn print_formatted(&self) {
        let today = datetime::today();
        println!(
            "{:>4}\t{:>6}\t{:<30}\t{:<30}\t{:>6}\t{:<10}\t{}",
            "ID", "Number", "Name", "Email", "Shares", "Since", "Member"
        );
        println!("{:-<120}", "-");

        for member in self {
            let active = if member.is_member(today) { "*" } else { "" };
            println!(
                "{:>4}\t{:>6}\t{:<30}\t{:<30}\t{:>6}\t{:<10}\t{}",
                member.id,
                or_none(member.membership_number),
                member.full_name(),
                member.email,
                member.num_shares,
                or_none(member.membership_date),
                active
            );
        }
    }
}

impl PrintFormatted for Vec<Shares> {
    fn print_formatted(&self) {
        println!("{:>4}\t{:>6}\t{:<10}\t{}", "ID", "Number", "Acquired", "Reference");
        for shares in self {
            println!(
                "{:>4}\t{:>6}\t{:<10}\t{}",
                shares.id, shares.number, shares.date_of_acquisition, shares.reference_code
            );
        }
    }
}

impl PrintFormatted for Dues {
    fn print_formatted(&self) {
        println!("Year:\t\t\t{}", self.year);
        println!("Start:\t\t\t{}", self.start);
        println!("Amount:\t\t\t{:.2}", self.amount);
        if let Some(reduced) = self.amount_reduced.filter(|_| self.reduced) {
            println!("Reduced To:\t\t{:.2}", reduced);
        }
        println!("Balance:\t\t{:.2}", self.balance);
        println!("Paid:\t\t\t{:.2}\t({})", self.amount_paid, or_none(self.paid_date));
        println!("Invoice:\t\t{}\t({})", or_none(self.invoice_no), or_none(self.invoice_date));
    }
}

impl PrintFormatted for DuesInvoice {
    fn print_formatted(&self) {
        println!("Invoice:\t\t{}", self.invoice_no_string);
        println!("Date:\t\t\t{}", self.invoice_date);
        println!("Amount:\t\t\t{:.2}", self.invoice_amount);
        println!("Member:\t\t\t{}\t({})", self.member_id, or_none(self.membership_no));
        println!("Email:\t\t\t{}", self.email);
        println!("Reversal:\t\t{}", self.is_reversal);
        println!("Cancelled:\t\t{}", self.is_cancelled);
        println!("Altered:\t\t{}", self.is_altered);
        println!("Preceding:\t\t{}", or_none(self.preceding_invoice_no));
        println!("Succeeding:\t\t{}", or_none(self.succeeding_invoice_no));
    }
}

impl PrintFormatted for Vec<DuesInvoice> {
    fn print_formatted(&self) {
        println!(
            "{:<20}\t{:<10}\t{:>10}\t{:>6}\t{}",
            "Invoice", "Date", "Amount", "Member", "State"
        );
        println!("{:-<80}", "-");
        for invoice in self {
            let state = if invoice.is_reversal {
                "reversal"
            } else if invoice.is_cancelled {
                "cancelled"
            } else if invoice.is_altered {
                "altered"
            } else {
                ""
            };
            println!(
                "{:<20}\t{:<10}\t{:>10.2}\t{:>6}\t{}",
                invoice.invoice_no_string,
                invoice.invoice_date,
                invoice.invoice_amount,
                invoice.member_id,
                state
            );
        }
    }
}

impl PrintFormatted for Vec<MonthlyStats> {
    fn print_formatted(&self) {
        println!(
            "{:<8}\t{:>12}\t{:>12}\t{:>12}",
            "Month", "Invoiced", "Reversed", "Paid"
        );
        println!("{:-<60}", "-");
        for stats in self {
            println!(
                "{:<8}\t{:>12.2}\t{:>12.2}\t{:>12.2}",
                stats.month.format("%Y-%m"),
                stats.amount_invoiced_normal,
                stats.amount_invoiced_reversal,
                stats.amount_paid
            );
        }
    }
}

impl PrintFormatted for Vec<GeneralAssembly> {
    fn print_formatted(&self) {
        println!("{:>4}\t{:<10}\t{}", "No", "Date", "Name");
        for assembly in self {
            println!(
                "{:>4}\t{:<10}\t{}",
                assembly.number, assembly.date, assembly.name
            );
        }
    }
}

impl PrintFormatted for Invitation {
    fn print_formatted(&self) {
        println!(
            "Invited member {} to assembly {} at {} ({})",
            self.member_id, self.general_assembly_number, self.sent_at, self.token
        );
    }
}
