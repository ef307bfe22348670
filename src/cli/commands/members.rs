use super::check;
use crate::cli::Cli;
use crate::cli::formatting::{PrintFormatted, print_empty};
use crate::core::errors::FairshareError;
use crate::core::formatting::member_label;
use crate::core::models::{GroupId, UserId};
use clap::{Args, Subcommand};

#[derive(Subcommand, Debug)]
pub enum MembersCommand {
    /// List members of a group
    #[clap(name = "list")]
    List(ListMembers),
    /// Add a member to a group
    #[clap(name = "add")]
    Add(AddMember),
}

impl MembersCommand {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        match self {
            MembersCommand::List(cmd) => cmd.run(cli).await,
            MembersCommand::Add(cmd) => cmd.run(cli).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListMembers {
    #[clap(short, long)]
    pub group: GroupId,
}

impl ListMembers {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut page = cli.group_page(self.group)?;
        page.load_group().await;
        let state = page.state();
        check(&state.group.error)?;

        println!("{}", state.group_name().unwrap_or("Untitled group"));
        if state.members().is_empty() {
            print_empty("members");
        }
        let names = state.member_names();
        for member in state.members() {
            member.print_formatted(&names);
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddMember {
    #[clap(short, long)]
    pub group: GroupId,
    pub name: String,
}

impl AddMember {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut page = cli.group_page(self.group)?;
        if !page.add_member(&self.name).await {
            return check(&page.state().add_member_error);
        }
        println!("Added {} to group {}", self.name.trim(), self.group);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct WhoamiCommand {
    #[clap(short, long)]
    pub group: GroupId,
    /// Remember this member as you in the group
    #[clap(long)]
    pub set: Option<UserId>,
}

impl WhoamiCommand {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut page = cli.group_page(self.group)?;
        page.load_group().await;
        check(&page.state().group.error)?;

        if let Some(user_id) = self.set {
            if !page.set_current_user(user_id).await {
                return Err(FairshareError::invalid_input(
                    "set",
                    "Unknown member",
                    format!("User #{} is not a member of group {}", user_id, self.group),
                ));
            }
        }

        let state = page.state();
        match state.current_user_id {
            Some(user_id) => println!("{}\t{}", user_id, member_label(&state.member_names(), user_id)),
            None => print_empty("members"),
        }
        Ok(())
    }
}
