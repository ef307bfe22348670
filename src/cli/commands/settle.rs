use super::check;
use crate::cli::Cli;
use crate::cli::formatting::{PrintFormatted, print_empty};
use crate::core::confirmation::TransferKey;
use crate::core::errors::FairshareError;
use crate::core::formatting::parse_number;
use crate::core::models::{GroupId, UserId};
use clap::{Args, Subcommand};

#[derive(Subcommand, Debug)]
pub enum SettleCommand {
    /// Suggested transfers that would settle the group
    #[clap(name = "list")]
    List(ListSettlements),
    /// Confirm that a suggested transfer was paid
    #[clap(name = "confirm")]
    Confirm(ConfirmTransfer),
    /// Ask the API for a fresh confirmation id
    #[clap(name = "confirmation-id")]
    ConfirmationId(GenerateConfirmationId),
}

impl SettleCommand {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        match self {
            SettleCommand::List(cmd) => cmd.run(cli).await,
            SettleCommand::Confirm(cmd) => cmd.run(cli).await,
            SettleCommand::ConfirmationId(cmd) => cmd.run(cli).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListSettlements {
    #[clap(short, long)]
    pub group: GroupId,
}

impl ListSettlements {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut page = cli.group_page(self.group)?;
        page.load_group().await;
        page.load_settlements().await;

        let state = page.state();
        check(&state.settlements.error)?;
        let names = state.member_names();
        if state.settlements.data.is_empty() {
            println!("Everyone is settled up.");
        }
        for transfer in &state.settlements.data {
            transfer.print_formatted(&names);
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ConfirmTransfer {
    #[clap(short, long)]
    pub group: GroupId,
    #[clap(long)]
    pub from: UserId,
    #[clap(long)]
    pub to: UserId,
    /// Needed only when several suggestions share the same members
    #[clap(long)]
    pub amount: Option<String>,
    /// Makes retries of the same confirmation idempotent
    #[clap(long)]
    pub confirmation_id: Option<String>,
    /// Fetch a confirmation id from the API first
    #[clap(long, conflicts_with = "confirmation_id")]
    pub generate_id: bool,
}

impl ConfirmTransfer {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut page = cli.group_page(self.group)?;
        page.load_group().await;
        page.load_settlements().await;
        check(&page.state().settlements.error)?;

        let wanted_amount = self.amount.as_deref().and_then(parse_number);
        let transfer = page
            .state()
            .settlements
            .data
            .iter()
            .find(|transfer| {
                transfer.from_user_id == self.from
                    && transfer.to_user_id == self.to
                    && wanted_amount.is_none_or(|wanted| {
                        parse_number(&transfer.amount).is_some_and(|amount| (amount - wanted).abs() < 0.005)
                    })
            })
            .cloned()
            .ok_or_else(|| {
                FairshareError::invalid_input(
                    "transfer",
                    "No such transfer",
                    format!("No suggested transfer from #{} to #{} in group {}", self.from, self.to, self.group),
                )
            })?;

        if self.generate_id {
            if !page.generate_confirmation_id().await {
                return check(&page.state().confirmation_id_error);
            }
        } else if let Some(confirmation_id) = &self.confirmation_id {
            page.set_confirmation_id(confirmation_id);
        }

        if !page.confirm_transfer(&transfer).await {
            return check(&page.state().confirm_error);
        }
        let confirmation_id = page.state().confirmation_id.trim().to_string();
        println!(
            "Confirmed transfer {}{}",
            TransferKey::of(&transfer),
            if confirmation_id.is_empty() {
                String::new()
            } else {
                format!(" (confirmation id {})", confirmation_id)
            }
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct GenerateConfirmationId {
    #[clap(short, long)]
    pub group: GroupId,
}

impl GenerateConfirmationId {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut page = cli.group_page(self.group)?;
        if !page.generate_confirmation_id().await {
            return check(&page.state().confirmation_id_error);
        }
        let confirmation_id = &page.state().confirmation_id;
        if confirmation_id.is_empty() {
            print_empty("confirmation id");
        } else {
            println!("{}", confirmation_id);
        }
        Ok(())
    }
}
