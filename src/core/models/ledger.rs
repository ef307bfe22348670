use super::expense::Split;
use super::group::UserId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub user_id: UserId,
    #[serde(deserialize_with = "super::amount::text")]
    pub net_balance: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExplanationExpense {
    pub expense_id: Option<u64>,
    pub description: Option<String>,
    #[serde(deserialize_with = "super::amount::optional_text")]
    pub amount: Option<String>,
    pub payer_user_id: Option<UserId>,
    pub created_at: Option<String>,
    pub splits: Vec<Split>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationTransfer {
    pub transfer_id: Option<u64>,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    #[serde(deserialize_with = "super::amount::text")]
    pub amount: String,
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Contribution {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "super::amount::optional_text")]
    pub amount: Option<String>,
    pub description: Option<String>,
    pub timestamp: Option<String>,
    pub reference_id: Option<u64>,
}

/// Transfers touching one member, either split by direction or as one list.
#[derive(Clone, Debug, PartialEq)]
pub enum TransferBreakdown {
    Directional {
        incoming: Vec<ExplanationTransfer>,
        outgoing: Vec<ExplanationTransfer>,
    },
    Undirected(Vec<ExplanationTransfer>),
}

impl Default for TransferBreakdown {
    fn default() -> Self {
        TransferBreakdown::Undirected(Vec::new())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LedgerExplanationEntry {
    pub user_id: UserId,
    pub net_balance: Option<String>,
    pub expenses: Vec<ExplanationExpense>,
    pub transfers: TransferBreakdown,
    pub contributions: Vec<Contribution>,
}

/// Which owes figure to fetch: the live balance or the all-time total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwesView {
    Current,
    Historical,
}
