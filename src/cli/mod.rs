pub mod commands;
pub mod formatting;

use crate::config::CONFIG;
use crate::core::errors::FairshareError;
use crate::core::models::GroupId;
use crate::core::services::GroupPageController;
use crate::infrastructure::api::http::HttpLedgerApi;
use crate::infrastructure::storage::file::FilePreferenceStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{
    ConfirmedCommand, ExpensesCommand, ExplainCommand, GroupsCommand, HistoryCommand, LedgerCommand, MembersCommand,
    OwesCommand, SettleCommand, StatusCommand, WhoamiCommand,
};

#[derive(Parser, Debug)]
#[clap(name = "fairshare", version = env!("CARGO_PKG_VERSION"), about = "Shared expenses client for the Fairshare ledger API")]
pub struct Cli {
    /// Base URL of the ledger API
    #[clap(long, env = "FAIRSHARE_API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Where the selected current user per group is remembered
    #[clap(long, env = "FAIRSHARE_PREFERENCES_PATH")]
    pub preferences: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show API status and health
    #[clap(name = "status")]
    Status(StatusCommand),
    /// List, create and rename groups
    #[clap(subcommand, name = "groups")]
    Groups(GroupsCommand),
    /// List and add members of a group
    #[clap(subcommand, name = "members")]
    Members(MembersCommand),
    /// Show or select who you are in a group
    #[clap(name = "whoami")]
    Whoami(WhoamiCommand),
    /// List, add, edit and delete expenses
    #[clap(subcommand, name = "expenses")]
    Expenses(ExpensesCommand),
    /// Suggested transfers and their confirmation
    #[clap(subcommand, name = "settle")]
    Settle(SettleCommand),
    /// Net balance per member
    #[clap(name = "ledger")]
    Ledger(LedgerCommand),
    /// Why a member's balance is what it is
    #[clap(name = "explain")]
    Explain(ExplainCommand),
    /// Audit history of the group
    #[clap(name = "history")]
    History(HistoryCommand),
    /// Transfers already confirmed as paid
    #[clap(name = "confirmed")]
    Confirmed(ConfirmedCommand),
    /// What one member owes another
    #[clap(name = "owes")]
    Owes(OwesCommand),
}

impl Cli {
    pub fn init() -> Self {
        Self::parse()
    }

    pub fn api(&self) -> Result<HttpLedgerApi, FairshareError> {
        HttpLedgerApi::new(&CONFIG.base_url(self.api_base_url.as_deref())?)
    }

    pub fn preferences(&self) -> FilePreferenceStore {
        FilePreferenceStore::new(
            self.preferences
                .clone()
                .unwrap_or_else(|| CONFIG.preferences_path.clone()),
        )
    }

    pub fn group_page(&self, group_id: GroupId) -> Result<GroupPageController<HttpLedgerApi, FilePreferenceStore>, FairshareError> {
        GroupPageController::new(self.api()?, self.preferences(), group_id)
    }

    pub async fn run(self) -> Result<(), FairshareError> {
        match &self.command {
            Command::Status(cmd) => cmd.run(&self).await,
            Command::Groups(cmd) => cmd.run(&self).await,
            Command::Members(cmd) => cmd.run(&self).await,
            Command::Whoami(cmd) => cmd.run(&self).await,
            Command::Expenses(cmd) => cmd.run(&self).await,
            Command::Settle(cmd) => cmd.run(&self).await,
            Command::Ledger(cmd) => cmd.run(&self).await,
            Command::Explain(cmd) => cmd.run(&self).await,
            Command::History(cmd) => cmd.run(&self).await,
            Command::Confirmed(cmd) => cmd.run(&self).await,
            Command::Owes(cmd) => cmd.run(&self).await,
        }
    }
}
