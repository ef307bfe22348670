use super::group::{GroupId, UserId};
use serde::{Deserialize, Serialize};

/// Suggested payment computed by the API. Never persisted by the client.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettlementTransfer {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    #[serde(deserialize_with = "super::amount::text")]
    pub amount: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedTransfer {
    pub id: u64,
    pub group_id: GroupId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    #[serde(deserialize_with = "super::amount::text")]
    pub amount: String,
    pub confirmation_id: Option<String>,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmTransfersRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_id: Option<String>,
    pub transfers: Vec<SettlementTransfer>,
}
