use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use inquire::Confirm;

use c3s_data::{GeneralAssembly, GeneralAssemblyFilter, Query};
use c3s_db::Connection;
use c3s_membership::assemblies;

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Assembly {
    /// List general assemblies
    #[clap(name = "list")]
    List(ListAssemblies),
    /// Create a general assembly
    #[clap(name = "create")]
    Create(CreateAssembly),
    /// Change name and date of an assembly
    #[clap(name = "edit")]
    Edit(EditAssembly),
    /// Invite members to an assembly
    #[clap(name = "invite")]
    Invite(InviteMembers),
}

impl Assembly {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Assembly::List(cmd) => cmd.run(db).await,
            Assembly::Create(cmd) => cmd.run(db).await,
            Assembly::Edit(cmd) => cmd.run(db).await,
            Assembly::Invite(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListAssemblies {
    /// Only assemblies on or after this date
    #[clap(short, long)]
    pub after: Option<NaiveDate>,
}

impl ListAssemblies {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let assemblies: Vec<GeneralAssembly> = db
            .query(&GeneralAssemblyFilter {
                date_after: self.after,
                ..Default::default()
            })
            .await?;
        assemblies.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CreateAssembly {
    #[clap(short, long)]
    pub name: String,
    #[clap(short, long)]
    pub date: NaiveDate,
}

impl CreateAssembly {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let assembly = assemblies::create_assembly(db, &self.name, self.date).await?;
        println!("Created general assembly {}.", assembly.number);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct EditAssembly {
    #[clap(short = 'N', long)]
    pub number: u32,
    #[clap(short, long)]
    pub name: String,
    #[clap(short, long)]
    pub date: NaiveDate,
}

impl EditAssembly {
    pub async fn run(self, db: &Connection) -> Result<()> {
        assemblies::edit_assembly(db, self.number, &self.name, self.date).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct InviteMembers {
    #[clap(short = 'N', long)]
    pub number: u32,
    /// Invite this member, otherwise the next batch of uninvited members
    #[clap(short, long)]
    pub id: Option<u32>,
    #[clap(short, long, default_value_t = 100)]
    pub batch: usize,
}

impl InviteMembers {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let now = Local::now().naive_local();
        if let Some(id) = self.id {
            let invitation = assemblies::invite_member(db, self.number, id, now).await?;
            invitation.print_formatted();
            return Ok(());
        }

        let invitees = assemblies::get_invitees(db, self.number, self.batch).await?;
        if invitees.is_empty() {
            println!("All members are invited.");
            return Ok(());
        }
        let message = format!(
            "Invite {} members to assembly {}?",
            invitees.len(),
            self.number
        );
        let confirm = Confirm::new(&message).with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        for member in invitees {
            let invitation = assemblies::invite_member(db, self.number, member.id, now).await?;
            invitation.print_formatted();
        }
        Ok(())
    }
}
