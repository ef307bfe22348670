use super::{ListArgs, check, parse_member_value};
use crate::cli::Cli;
use crate::cli::formatting::{PrintFormatted, print_empty, print_page_footer};
use crate::core::errors::FairshareError;
use crate::core::formatting::format_money;
use crate::core::models::{ExpenseId, GroupId, UserId};
use crate::core::pagination::{PageRequest, PageSize, Sort};
use crate::core::split::{ExpenseDraft, SplitMode, remaining_amount};
use clap::{Args, Subcommand};
use tracing::debug;

#[derive(Subcommand, Debug)]
pub enum ExpensesCommand {
    /// List recorded expenses
    #[clap(name = "list")]
    List(ListExpenses),
    /// Record a new expense split between all members
    #[clap(name = "add")]
    Add(AddExpense),
    /// Change an existing expense
    #[clap(name = "edit")]
    Edit(EditExpense),
    /// Delete an expense
    #[clap(name = "delete")]
    Delete(DeleteExpense),
}

impl ExpensesCommand {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        match self {
            ExpensesCommand::List(cmd) => cmd.run(cli).await,
            ExpensesCommand::Add(cmd) => cmd.run(cli).await,
            ExpensesCommand::Edit(cmd) => cmd.run(cli).await,
            ExpensesCommand::Delete(cmd) => cmd.run(cli).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListExpenses {
    #[clap(short, long)]
    pub group: GroupId,
    #[clap(flatten)]
    pub list: ListArgs,
}

impl ListExpenses {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut page = cli.group_page(self.group)?;
        page.load_group().await;
        page.load_expenses(self.list.request(Sort::created_desc())).await;

        let state = page.state();
        check(&state.expenses.error)?;
        let names = state.member_names();
        if state.expenses.items.is_empty() {
            print_empty("expenses");
        }
        for expense in &state.expenses.items {
            expense.print_formatted(&names);
        }
        print_page_footer(&state.expenses);
        Ok(())
    }
}

/// Split inputs shared by `add` and `edit`.
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// equal, exact, percentage or shares
    #[clap(long)]
    pub split: Option<SplitMode>,
    /// Per-member input as MEMBER_ID=VALUE, repeated for each member
    #[clap(long = "value", value_parser = parse_member_value)]
    pub values: Vec<(UserId, String)>,
}

impl SplitArgs {
    fn apply(&self, draft: &mut ExpenseDraft) -> Result<(), FairshareError> {
        if let Some(mode) = self.split {
            draft.split_mode = mode;
        }
        if self.values.is_empty() {
            return Ok(());
        }
        let mode = draft.split_mode;
        let inputs = draft.inputs_mut(mode).ok_or_else(|| {
            FairshareError::invalid_input(
                "value",
                "Unused values",
                "Per-member values need --split exact, percentage or shares",
            )
        })?;
        for (user_id, value) in &self.values {
            inputs.insert(*user_id, value.clone());
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddExpense {
    #[clap(short, long)]
    pub group: GroupId,
    #[clap(short, long)]
    pub description: String,
    #[clap(short, long)]
    pub amount: String,
    /// Who paid; defaults to the current user
    #[clap(short, long)]
    pub payer: Option<UserId>,
    #[clap(flatten)]
    pub split: SplitArgs,
}

impl AddExpense {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut page = cli.group_page(self.group)?;
        page.load_group().await;
        check(&page.state().group.error)?;

        let payer = self.payer.or(page.state().current_user_id);
        let draft = page.new_expense_mut();
        draft.description = self.description.clone();
        draft.amount = self.amount.clone();
        draft.payer_user_id = payer;
        self.split.apply(draft)?;
        if draft.split_mode == SplitMode::Exact {
            let ids: Vec<UserId> = draft.exact_amounts.keys().copied().collect();
            if let Some(left) = remaining_amount(&draft.amount, &draft.exact_amounts, &ids) {
                debug!("Unassigned amount before submit: {}", format_money(left));
            }
        }

        if !page.add_expense().await {
            return check(&page.state().add_expense_error);
        }
        println!("Recorded \"{}\" in group {}", self.description, self.group);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct EditExpense {
    #[clap(short, long)]
    pub group: GroupId,
    #[clap(short, long)]
    pub expense: ExpenseId,
    #[clap(short, long)]
    pub description: Option<String>,
    #[clap(short, long)]
    pub amount: Option<String>,
    #[clap(short, long)]
    pub payer: Option<UserId>,
    #[clap(flatten)]
    pub split: SplitArgs,
}

impl EditExpense {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut page = cli.group_page(self.group)?;
        page.load_group().await;
        check(&page.state().group.error)?;

        let mut page_number = 1;
        loop {
            let request = PageRequest {
                page: page_number,
                size: PageSize::Hundred,
                sort: Sort::created_desc(),
            };
            page.load_expenses(request).await;
            check(&page.state().expenses.error)?;
            if page.start_edit(self.expense) {
                break;
            }
            if page_number >= page.state().expenses.total_pages {
                return Err(FairshareError::invalid_input(
                    "expense",
                    "Unknown expense",
                    format!("Expense #{} was not found in group {}", self.expense, self.group),
                ));
            }
            page_number += 1;
        }

        if let Some(draft) = page.edit_draft_mut() {
            if let Some(description) = &self.description {
                draft.description = description.clone();
            }
            if let Some(amount) = &self.amount {
                draft.amount = amount.clone();
            }
            if let Some(payer) = self.payer {
                draft.payer_user_id = Some(payer);
            }
            self.split.apply(draft)?;
        }

        if !page.update_expense().await {
            let error = page.state().editing.as_ref().and_then(|edit| edit.error.clone());
            return check(&error);
        }
        println!("Updated expense #{} in group {}", self.expense, self.group);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteExpense {
    #[clap(short, long)]
    pub group: GroupId,
    #[clap(short, long)]
    pub expense: ExpenseId,
}

impl DeleteExpense {
    pub async fn run(&self, cli: &Cli) -> Result<(), FairshareError> {
        let mut page = cli.group_page(self.group)?;
        if !page.delete_expense(self.expense).await {
            return check(&page.state().delete_expense_error);
        }
        println!("Deleted expense #{} from group {}", self.expense, self.group);
        Ok(())
    }
}
