pub mod event;
pub mod expense;
pub mod group;
pub mod ledger;
pub mod page;
pub mod settlement;

pub use event::EventRecord;
pub use expense::{Expense, ExpenseId, ExpensePayload, Split};
pub use group::{Group, GroupId, GroupSummary, Member, UserId};
pub use ledger::{
    Contribution, ExplanationExpense, ExplanationTransfer, LedgerEntry, LedgerExplanationEntry, OwesView,
    TransferBreakdown,
};
pub use page::Page;
pub use settlement::{ConfirmTransfersRequest, ConfirmedTransfer, SettlementTransfer};

/// Decimal amounts are strings on the wire, but some endpoints send bare
/// numbers. Both are accepted and kept as text.
pub(crate) mod amount {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn to_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = Value::deserialize(deserializer)?;
        to_text(value).ok_or_else(|| serde::de::Error::custom("expected a decimal string or number"))
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<Value>::deserialize(deserializer)?.and_then(to_text))
    }
}
