use super::group::{GroupId, UserId};
use serde::{Deserialize, Serialize};

pub type ExpenseId = u64;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    pub user_id: UserId,
    #[serde(deserialize_with = "super::amount::text")]
    pub share_amount: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub expense_id: ExpenseId,
    pub group_id: GroupId,
    pub description: String,
    #[serde(deserialize_with = "super::amount::text")]
    pub amount: String,
    pub payer_user_id: UserId,
    pub created_at: Option<String>,
    #[serde(default)]
    pub splits: Vec<Split>,
}

/// Body of `POST`/`PATCH /groups/{id}/expenses`. The optional lists are
/// parallel to `participant_user_ids`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePayload {
    pub description: String,
    pub amount: String,
    pub payer_user_id: UserId,
    pub participant_user_ids: Vec<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_amounts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentages: Option<Vec<String>>,
}
