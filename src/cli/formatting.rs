use crate::core::explanation::ledger_why_parts;
use crate::core::formatting::{
    MISSING, MemberNames, format_contribution_description, format_money_text, format_timestamp, member_label,
};
use crate::core::models::{
    ConfirmedTransfer, EventRecord, Expense, ExplanationTransfer, LedgerEntry, LedgerExplanationEntry, Member, SettlementTransfer,
    TransferBreakdown,
};
use crate::core::pagination::PagedList;

pub trait PrintFormatted {
    fn print_formatted(&self, names: &MemberNames);
}

impl PrintFormatted for Member {
    fn print_formatted(&self, _names: &MemberNames) {
        println!("{}\t{}", self.id, self.display_name());
    }
}

impl PrintFormatted for Expense {
    fn print_formatted(&self, names: &MemberNames) {
        println!(
            "#{}\t{}\t{}\tpaid by {}\t{}",
            self.expense_id,
            self.description,
            format_money_text(Some(&self.amount)),
            member_label(names, self.payer_user_id),
            format_timestamp(self.created_at.as_deref())
        );
        for split in &self.splits {
            println!(
                "\t\t{}: {}",
                member_label(names, split.user_id),
                format_money_text(Some(&split.share_amount))
            );
        }
    }
}

impl PrintFormatted for SettlementTransfer {
    fn print_formatted(&self, names: &MemberNames) {
        println!(
            "{} -> {}\t{}",
            member_label(names, self.from_user_id),
            member_label(names, self.to_user_id),
            format_money_text(Some(&self.amount))
        );
    }
}

impl PrintFormatted for ConfirmedTransfer {
    fn print_formatted(&self, names: &MemberNames) {
        println!(
            "#{}\t{} -> {}\t{}\t{}\t{}",
            self.id,
            member_label(names, self.from_user_id),
            member_label(names, self.to_user_id),
            format_money_text(Some(&self.amount)),
            self.confirmation_id.as_deref().unwrap_or(MISSING),
            format_timestamp(Some(&self.created_at))
        );
    }
}

impl PrintFormatted for LedgerEntry {
    fn print_formatted(&self, names: &MemberNames) {
        println!(
            "{}\t{}",
            member_label(names, self.user_id),
            format_money_text(Some(&self.net_balance))
        );
    }
}

impl PrintFormatted for LedgerExplanationEntry {
    fn print_formatted(&self, names: &MemberNames) {
        println!(
            "{}\tnet {}",
            member_label(names, self.user_id),
            format_money_text(self.net_balance.as_deref())
        );
        let why = ledger_why_parts(self, names);
        if !why.is_empty() {
            println!("  Why: {}", why.join(" · "));
        }

        for expense in &self.expenses {
            println!(
                "  Expense {}\t{}\tpaid by {}",
                expense.description.as_deref().unwrap_or(MISSING),
                format_money_text(expense.amount.as_deref()),
                expense
                    .payer_user_id
                    .map(|id| member_label(names, id))
                    .unwrap_or_else(|| MISSING.to_string())
            );
        }

        let print_transfers = |label: &str, transfers: &[ExplanationTransfer]| {
            for transfer in transfers {
                println!(
                    "  {} {} -> {}\t{}",
                    label,
                    member_label(names, transfer.from_user_id),
                    member_label(names, transfer.to_user_id),
                    format_money_text(Some(&transfer.amount))
                );
            }
        };
        match &self.transfers {
            TransferBreakdown::Directional { incoming, outgoing } => {
                print_transfers("Incoming", incoming);
                print_transfers("Outgoing", outgoing);
            }
            TransferBreakdown::Undirected(transfers) => print_transfers("Transfer", transfers),
        }

        for contribution in &self.contributions {
            println!(
                "  {}\t{}\t{}",
                contribution.kind.as_deref().unwrap_or(MISSING),
                format_money_text(contribution.amount.as_deref()),
                format_contribution_description(contribution.description.as_deref(), names)
            );
        }
    }
}

/// Events need the differ, so they are printed with their rendered details.
pub fn print_event(event: &EventRecord, details: &str) {
    println!(
        "#{}\t{}\t{}{}",
        event.event_id,
        event.event_type,
        format_timestamp(Some(&event.created_at)),
        event
            .expense_id
            .map(|id| format!("\texpense #{}", id))
            .unwrap_or_default()
    );
    for line in details.lines() {
        println!("  {}", line);
    }
}

pub fn print_page_footer<T>(list: &PagedList<T>) {
    let pages = list
        .visible_pages()
        .into_iter()
        .map(|page| {
            if page == list.page {
                format!("[{}]", page)
            } else {
                page.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "Page {} of {} ({} items, {} per page, sort {})  {}",
        list.page, list.total_pages, list.total_items, list.size, list.sort, pages
    );
}

pub fn print_empty(what: &str) {
    println!("No {} yet.", what);
}
