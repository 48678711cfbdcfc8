use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use inquire::Confirm;

use c3s_accounting::datetime;
use c3s_data::{
    Delete, Member, MemberFilter, MembershipLossType, MembershipType, Query, Retrieve, Update,
};
use c3s_db::Connection;
use c3s_membership::{applications, shares};

use crate::formatting::{print_json, PrintFormatted};

#[derive(Subcommand, Debug)]
pub enum Members {
    /// List applicants and members
    #[clap(name = "list")]
    List(ListMembers),
    /// Show a member with shares and dues
    #[clap(name = "show")]
    Show(ShowMember),
    /// Submit a membership application
    #[clap(name = "apply")]
    Apply(Apply),
    /// Record the signed application form
    #[clap(name = "signature")]
    Signature(RecordSignature),
    /// Record the payment for the shares
    #[clap(name = "payment")]
    Payment(RecordPayment),
    /// Accept an application
    #[clap(name = "accept")]
    Accept(AcceptMembership),
    /// End a membership
    #[clap(name = "loss")]
    Loss(MembershipLoss),
    /// Acquire additional shares
    #[clap(name = "shares")]
    Shares(AcquireShares),
    /// Update contact data
    #[clap(name = "set")]
    Update(UpdateMember),
    /// Delete an applicant
    #[clap(name = "delete")]
    Delete(DeleteMember),
}

impl Members {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Members::List(cmd) => cmd.run(db).await,
            Members::Show(cmd) => cmd.run(db).await,
            Members::Apply(cmd) => cmd.run(db).await,
            Members::Signature(cmd) => cmd.run(db).await,
            Members::Payment(cmd) => cmd.run(db).await,
            Members::Accept(cmd) => cmd.run(db).await,
            Members::Loss(cmd) => cmd.run(db).await,
            Members::Shares(cmd) => cmd.run(db).await,
            Members::Update(cmd) => cmd.run(db).await,
            Members::Delete(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListMembers {
    #[clap(short, long)]
    pub name: Option<String>,
    #[clap(short, long)]
    pub email: Option<String>,
    /// Only accepted members (or only open applications with `false`)
    #[clap(short, long)]
    pub accepted: Option<bool>,
    #[clap(long)]
    pub json: bool,
}

impl ListMembers {
    /// Run the command and list members
    pub async fn run(self, db: &Connection) -> Result<()> {
        let filter = MemberFilter {
            name: self.name,
            email: self.email,
            membership_accepted: self.accepted,
            ..Default::default()
        };

        let members: Vec<Member> = db.query(&filter).await?;
        if self.json {
            return print_json(&members);
        }
        println!("{} members.", members.len());
        members.print_formatted();

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ShowMember {
    #[clap(short, long)]
    pub id: u32,
    #[clap(long)]
    pub json: bool,
}

impl ShowMember {
    /// Run the command and show a member
    pub async fn run(self, db: &Connection) -> Result<()> {
        let member: Member = db.retrieve(self.id).await?;
        if self.json {
            return print_json(&member);
        }
        println!();
        member.print_formatted();

        let shares = member.get_shares(db).await?;
        if !shares.is_empty() {
            println!();
            shares.print_formatted();
        }
        for dues in member.get_dues(db).await? {
            println!();
            dues.print_formatted();
        }
        println!();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct Apply {
    #[clap(long)]
    pub firstname: String,
    #[clap(long, default_value = "")]
    pub lastname: String,
    #[clap(short, long)]
    pub email: String,
    #[clap(long, default_value = "")]
    pub address1: String,
    #[clap(long, default_value = "")]
    pub address2: String,
    #[clap(long, default_value = "")]
    pub postcode: String,
    #[clap(long, default_value = "")]
    pub city: String,
    #[clap(long, default_value = "DE")]
    pub country: String,
    #[clap(long, default_value = "de")]
    pub locale: String,
    #[clap(long)]
    pub date_of_birth: Option<NaiveDate>,
    #[clap(short = 't', long, default_value_t = MembershipType::Normal)]
    pub membership_type: MembershipType,
    #[clap(long)]
    pub legal_entity: bool,
    #[clap(short, long, default_value_t = 1)]
    pub shares: u32,
    #[clap(short = 'c', long)]
    pub notes: Option<String>,
    #[clap(long, default_value_t = datetime::today())]
    pub date: NaiveDate,
}

impl Apply {
    /// Run the command and store the application
    pub async fn run(self, db: &Connection) -> Result<()> {
        let applicant = Member {
            firstname: self.firstname,
            lastname: self.lastname,
            email: self.email,
            address1: self.address1,
            address2: self.address2,
            postcode: self.postcode,
            city: self.city,
            country: self.country,
            locale: self.locale,
            date_of_birth: self.date_of_birth,
            notes: self.notes.unwrap_or_default(),
            membership_type: self.membership_type,
            is_legalentity: self.legal_entity,
            num_shares: self.shares,
            date_of_submission: self.date,
            ..Default::default()
        };

        println!();
        applicant.print_formatted();
        println!();
        let confirm = Confirm::new("Submit application?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let member = applications::submit_application(db, applicant, self.date).await?;
        println!("Application stored with id {}.", member.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RecordSignature {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long, default_value_t = datetime::today())]
    pub date: NaiveDate,
}

impl RecordSignature {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let member = applications::record_signature(db, self.id, self.date).await?;
        println!("Signature of {} received on {}.", member.full_name(), self.date);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RecordPayment {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long, default_value_t = datetime::today())]
    pub date: NaiveDate,
}

impl RecordPayment {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let member = applications::record_payment(db, self.id, self.date).await?;
        println!("Payment of {} received on {}.", member.full_name(), self.date);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AcceptMembership {
    #[clap(short, long)]
    pub id: u32,
    /// Date of the board decision
    #[clap(short, long, default_value_t = datetime::today())]
    pub date: NaiveDate,
}

impl AcceptMembership {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let member: Member = db.retrieve(self.id).await?;
        let message = format!(
            "Accept {} as member from {}?",
            member.full_name(),
            self.date
        );
        let confirm = Confirm::new(&message).with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let member = applications::accept_membership(db, self.id, self.date).await?;
        if let Some(number) = member.membership_number {
            println!("Accepted with membership number {}.", number);
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct MembershipLoss {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub date: NaiveDate,
    /// resignation, expulsion, death, bankruptcy or transfer
    #[clap(short = 't', long = "type")]
    pub loss_type: MembershipLossType,
}

impl MembershipLoss {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let member: Member = db.retrieve(self.id).await?;
        let message = format!(
            "End membership of {} on {} ({})?",
            member.full_name(),
            self.date,
            self.loss_type
        );
        let confirm = Confirm::new(&message).with_default(false);
        if !confirm.prompt()? {
            return Ok(());
        }

        applications::record_membership_loss(db, self.id, self.date, self.loss_type).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AcquireShares {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub number: u32,
    #[clap(short, long, default_value_t = datetime::today())]
    pub date: NaiveDate,
}

impl AcquireShares {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let (member, package) = shares::acquire_shares(db, self.id, self.number, self.date).await?;
        println!(
            "{} acquired {} shares ({}), {} in total.",
            member.full_name(),
            package.number,
            package.reference_code,
            member.num_shares
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpdateMember {
    #[clap(short, long)]
    pub id: u32,
    #[clap(long)]
    pub firstname: Option<String>,
    #[clap(long)]
    pub lastname: Option<String>,
    #[clap(short, long)]
    pub email: Option<String>,
    #[clap(long)]
    pub address1: Option<String>,
    #[clap(long)]
    pub address2: Option<String>,
    #[clap(long)]
    pub postcode: Option<String>,
    #[clap(long)]
    pub city: Option<String>,
    #[clap(long)]
    pub country: Option<String>,
    #[clap(long)]
    pub locale: Option<String>,
    #[clap(short = 'c', long)]
    pub notes: Option<String>,
}

impl UpdateMember {
    /// Run command and update a member
    pub async fn run(self, db: &Connection) -> Result<()> {
        let member: Member = db.retrieve(self.id).await?;
        let mut update = member.clone();

        if let Some(firstname) = self.firstname {
            update.firstname = firstname;
        }
        if let Some(lastname) = self.lastname {
            update.lastname = lastname;
        }
        if let Some(email) = self.email {
            update.email = email;
        }
        if let Some(address1) = self.address1 {
            update.address1 = address1;
        }
        if let Some(address2) = self.address2 {
            update.address2 = address2;
        }
        if let Some(postcode) = self.postcode {
            update.postcode = postcode;
        }
        if let Some(city) = self.city {
            update.city = city;
        }
        if let Some(country) = self.country {
            update.country = country;
        }
        if let Some(locale) = self.locale {
            update.locale = locale;
        }
        if let Some(notes) = self.notes {
            update.notes = notes;
        }

        if update.email != member.email {
            let members: Vec<Member> = db
                .query(&MemberFilter {
                    email: Some(update.email.clone()),
                    ..Default::default()
                })
                .await?;
            if !members.is_empty() {
                return Err(anyhow!("Member with email {} already exists.", update.email));
            }
        }

        println!();
        (member, update.clone()).print_formatted();
        println!();
        let confirm = Confirm::new("Update member?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        db.update(update).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteMember {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteMember {
    pub async fn run(&self, db: &Connection) -> Result<()> {
        let member: Member = db.retrieve(self.id).await?;
        if member.membership_accepted {
            return Err(anyhow!(
                "{} is an accepted member, record a membership loss instead.",
                member.full_name()
            ));
        }
        println!();
        member.print_formatted();
        println!();
        let confirm = Confirm::new("Delete application from database?").with_default(false);
        if !confirm.prompt()? {
            return Ok(());
        }
        db.delete(member).await?;
        Ok(())
    }
}
