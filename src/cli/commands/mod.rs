mod expenses;
mod groups;
mod ledger;
mod members;
mod settle;

pub use expenses::ExpensesCommand;
pub use groups::{GroupsCommand, StatusCommand};
pub use ledger::{ConfirmedCommand, ExplainCommand, HistoryCommand, LedgerCommand, OwesCommand};
pub use members::{MembersCommand, WhoamiCommand};
pub use settle::SettleCommand;

use crate::core::errors::FairshareError;
use crate::core::models::UserId;
use crate::core::pagination::{PageRequest, PageSize, Sort};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Page to show, starting at 1
    #[clap(long, default_value_t = 1)]
    pub page: u32,
    /// Rows per page: 5, 10, 25, 50 or 100
    #[clap(long, default_value = "10")]
    pub size: PageSize,
    /// Sort as `field,asc` or `field,desc`
    #[clap(long)]
    pub sort: Option<Sort>,
}

impl ListArgs {
    pub fn request(&self, default_sort: Sort) -> PageRequest {
        PageRequest {
            page: self.page.max(1),
            size: self.size,
            sort: self.sort.clone().unwrap_or(default_sort),
        }
    }
}

/// Turns the error banner of a section into a command failure.
pub(crate) fn check(error: &Option<String>) -> Result<(), FairshareError> {
    match error {
        Some(message) => Err(FairshareError::Section(message.clone())),
        None => Ok(()),
    }
}

/// `--value 3=12.50` style per-member input.
pub(crate) fn parse_member_value(raw: &str) -> Result<(UserId, String), String> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected MEMBER_ID=VALUE, got '{}'", raw))?;
    let id = id
        .trim()
        .parse::<UserId>()
        .map_err(|_| format!("'{}' is not a member id", id.trim()))?;
    Ok((id, value.trim().to_string()))
}
