use super::{ListArgs, check};
use crate::cli::Cli;
use crate::cli::formatting::{print_empty, print_page_footer};
use crate::core::errors::FairshareError;
use crate::core::models::GroupId;
use crate::core::pagination::Sort;
use crate::core::services::HomeController;
use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut home = HomeController::new(cli.api()?);
        home.load_status().await;
        let state = home.state();
        println!("API:\t{}", state.root_status.as_deref().unwrap_or("—"));
        println!("Health:\t{}", state.health_status.as_deref().unwrap_or("—"));
        check(&state.status_error)
    }
}

#[derive(Subcommand, Debug)]
pub enum GroupsCommand {
    /// List groups, optionally filtered by name (`*` and `?` are wildcards)
    #[clap(name = "list")]
    List(ListGroups),
    /// Create a group
    #[clap(name = "create")]
    Create(CreateGroup),
    /// Rename a group
    #[clap(name = "rename")]
    Rename(RenameGroup),
}

impl GroupsCommand {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        match self {
            GroupsCommand::List(cmd) => cmd.run(cli).await,
            GroupsCommand::Create(cmd) => cmd.run(cli).await,
            GroupsCommand::Rename(cmd) => cmd.run(cli).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListGroups {
    #[clap(short, long)]
    pub filter: Option<String>,
    #[clap(flatten)]
    pub list: ListArgs,
}

impl ListGroups {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut home = HomeController::new(cli.api()?);
        if let Some(filter) = &self.filter {
            home.set_filter(filter);
        }
        let request = self.list.request(Sort::id_desc());
        home.load_groups(request).await;

        let state = home.state();
        check(&state.groups.error)?;
        if !state.server_filter_applied {
            println!(
                "Backend filter is not applied yet. Showing matches on the current page for \"{}\".",
                state.filter
            );
        }
        let groups = state.filtered_groups();
        if groups.is_empty() {
            print_empty("groups");
        }
        for group in groups {
            let members = group
                .member_count
                .map(|count| format!("{} members", count))
                .unwrap_or_default();
            println!(
                "{}\t{}\t{}",
                group.id,
                group.name.as_deref().map(str::trim).filter(|n| !n.is_empty()).unwrap_or("Untitled group"),
                members
            );
        }
        print_page_footer(&state.groups);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CreateGroup {
    pub name: String,
}

impl CreateGroup {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut home = HomeController::new(cli.api()?);
        match home.create_group(&self.name).await {
            Some(group) => {
                println!("Created group {}: {}", group.id, group.name.as_deref().unwrap_or(""));
                Ok(())
            }
            None => check(&home.state().create_error),
        }
    }
}

#[derive(Args, Debug)]
pub struct RenameGroup {
    pub group: GroupId,
    pub name: String,
}

impl RenameGroup {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut home = HomeController::new(cli.api()?);
        if home.rename_group(self.group, &self.name).await {
            println!("Renamed group {} to {}", self.group, self.name.trim());
            Ok(())
        } else {
            check(&home.state().rename_error)
        }
    }
}
