use super::group::GroupId;
use serde::{Deserialize, Serialize};

/// Audit record of a past mutation. `payload` is raw JSON text, possibly
/// carrying a `before`/`after` pair.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event_id: u64,
    pub group_id: GroupId,
    pub expense_id: Option<u64>,
    pub event_type: String,
    pub payload: String,
    pub created_at: String,
}
