use super::{ListArgs, check};
use crate::cli::Cli;
use crate::cli::formatting::{PrintFormatted, print_empty, print_event, print_page_footer};
use crate::core::errors::FairshareError;
use crate::core::formatting::{format_money, member_label};
use crate::core::models::{GroupId, OwesView, UserId};
use crate::core::pagination::Sort;
use clap::Args;

#[derive(Args, Debug)]
pub struct LedgerCommand {
    #[clap(short, long)]
    pub group: GroupId,
}

impl LedgerCommand {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut page = cli.group_page(self.group)?;
        page.load_group().await;
        page.load_ledger().await;

        let state = page.state();
        check(&state.ledger.error)?;
        let names = state.member_names();
        if state.ledger.data.is_empty() {
            print_empty("balances");
        }
        for entry in &state.ledger.data {
            entry.print_formatted(&names);
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ExplainCommand {
    #[clap(short, long)]
    pub group: GroupId,
    /// Member to explain; defaults to the current user
    #[clap(short, long)]
    pub user: Option<UserId>,
    /// Explain every member
    #[clap(long, conflicts_with = "user")]
    pub all: bool,
}

impl ExplainCommand {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut page = cli.group_page(self.group)?;
        page.load_group().await;
        page.load_ledger_explanation().await;
        check(&page.state().explanation.error)?;

        if let Some(user_id) = self.user {
            if !page.select_explanation_user(user_id) {
                return Err(FairshareError::invalid_input(
                    "user",
                    "Nothing to explain",
                    format!("No ledger explanation for User #{}", user_id),
                ));
            }
        }

        let state = page.state();
        let names = state.member_names();
        if self.all {
            for entry in &state.explanation.data {
                entry.print_formatted(&names);
            }
            return Ok(());
        }
        match state.selected_explanation() {
            Some(entry) => entry.print_formatted(&names),
            None => print_empty("ledger explanation"),
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct HistoryCommand {
    #[clap(short, long)]
    pub group: GroupId,
    #[clap(flatten)]
    pub list: ListArgs,
}

impl HistoryCommand {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut page = cli.group_page(self.group)?;
        page.load_group().await;
        page.load_events(self.list.request(Sort::created_desc())).await;

        let state = page.state();
        check(&state.events.error)?;
        if state.events.items.is_empty() {
            print_empty("events");
        }
        for event in &state.events.items {
            print_event(event, &state.event_details(event));
        }
        print_page_footer(&state.events);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ConfirmedCommand {
    #[clap(short, long)]
    pub group: GroupId,
    /// Only transfers confirmed under this id
    #[clap(long)]
    pub confirmation_id: Option<String>,
    #[clap(flatten)]
    pub list: ListArgs,
}

impl ConfirmedCommand {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut page = cli.group_page(self.group)?;
        page.load_group().await;
        if let Some(confirmation_id) = &self.confirmation_id {
            page.set_confirmed_filter(confirmation_id);
        }
        page.load_confirmed_transfers(self.list.request(Sort::created_desc()))
            .await;

        let state = page.state();
        check(&state.confirmed.error)?;
        let names = state.member_names();
        if state.confirmed.items.is_empty() {
            print_empty("confirmed transfers");
        }
        for transfer in &state.confirmed.items {
            transfer.print_formatted(&names);
        }
        print_page_footer(&state.confirmed);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct OwesCommand {
    #[clap(short, long)]
    pub group: GroupId,
    #[clap(long)]
    pub from: UserId,
    #[clap(long)]
    pub to: UserId,
    /// All-time total instead of the current balance
    #[clap(long)]
    pub historical: bool,
}

impl OwesCommand {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        if self.from == self.to {
            return Err(FairshareError::invalid_input(
                "to",
                "Same member",
                "Pick two different members",
            ));
        }
        let view = if self.historical {
            OwesView::Historical
        } else {
            OwesView::Current
        };

        let mut page = cli.group_page(self.group)?;
        page.load_group().await;
        page.set_owes_members(Some(self.from), Some(self.to));
        page.load_owes(view).await;

        let state = page.state();
        check(&state.owes.error)?;
        let amount = match view {
            OwesView::Current => state.owes.current,
            OwesView::Historical => state.owes.historical,
        };
        let names = state.member_names();
        println!(
            "{} owes {} {}{}",
            member_label(&names, self.from),
            member_label(&names, self.to),
            format_money(amount.unwrap_or(0.0)),
            if self.historical { " (all time)" } else { "" }
        );
        Ok(())
    }
}
