//! Raw response shapes and their normalization into the crate's models.
//! Field-name variants the API has used over time are folded here and do not
//! leak past this module.

use crate::core::formatting::parse_number;
use crate::core::models::{Group, GroupSummary, LedgerEntry, Member, Page, SettlementTransfer};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMember {
    pub id: Option<u64>,
    pub user_id: Option<u64>,
    pub name: Option<String>,
    pub user_name: Option<String>,
}

impl RawMember {
    pub fn normalize(self) -> Option<Member> {
        let Some(id) = self.id.or(self.user_id) else {
            warn!("Dropping member without an id");
            return None;
        };
        Some(Member {
            id,
            name: self.name.or(self.user_name),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGroup {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub members: Option<Vec<RawMember>>,
}

impl RawGroup {
    pub fn normalize(self) -> Group {
        Group {
            id: self.id,
            name: self.name,
            members: self
                .members
                .unwrap_or_default()
                .into_iter()
                .filter_map(RawMember::normalize)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGroupSummary {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub member_count: Option<Value>,
    #[serde(default)]
    pub members_count: Option<Value>,
    #[serde(default)]
    pub total_members: Option<Value>,
}

fn count_of(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

impl RawGroupSummary {
    pub fn normalize(self) -> GroupSummary {
        let member_count = count_of(self.member_count.as_ref())
            .or_else(|| count_of(self.members_count.as_ref()))
            .or_else(|| count_of(self.total_members.as_ref()));
        GroupSummary {
            id: self.id,
            name: self.name,
            member_count,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPage<T> {
    pub items: Option<Vec<T>>,
    pub total_items: Option<i64>,
    pub total_pages: Option<i64>,
    pub current_page: Option<i64>,
    pub page_size: Option<i64>,
}

impl<T> RawPage<T> {
    /// Negative or missing counters fall back to safe values: one page, zero
    /// items, and an unknown current page.
    pub fn normalize<U>(self, item: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.unwrap_or_default().into_iter().map(item).collect(),
            total_items: self.total_items.filter(|n| *n >= 0).unwrap_or(0) as u64,
            total_pages: self
                .total_pages
                .filter(|n| *n > 0)
                .map(|n| n.min(u32::MAX as i64) as u32)
                .unwrap_or(1),
            current_page: self
                .current_page
                .filter(|n| *n >= 0)
                .map(|n| n.min(u32::MAX as i64) as u32),
            page_size: self.page_size.filter(|n| *n > 0).map(|n| n.min(u32::MAX as i64) as u32),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransfersResponse {
    pub transfers: Option<Vec<SettlementTransfer>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LedgerResponse {
    pub entries: Option<Vec<LedgerEntry>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwesResponse {
    pub amount: Option<Value>,
}

impl OwesResponse {
    /// Anything that is not a number counts as nothing owed.
    pub fn amount(&self) -> f64 {
        match &self.amount {
            Some(Value::Number(n)) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
            Some(Value::String(s)) => parse_number(s).unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfirmationIdResponse {
    pub confirmation_id: Option<String>,
}

impl ConfirmationIdResponse {
    /// The endpoint has answered both `{"confirmationId": ".."}` and a bare
    /// JSON string.
    pub fn from_value(value: Value) -> Option<String> {
        let id = match value {
            Value::String(s) => Some(s),
            other => serde_json::from_value::<ConfirmationIdResponse>(other)
                .ok()
                .and_then(|response| response.confirmation_id),
        };
        id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty())
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn map_text(map: &Map<String, Value>) -> String {
    map.values().map(scalar_text).collect::<Vec<_>>().join(" ")
}

/// `GET /` and `GET /health` answer with small string maps; their values are
/// shown joined, or "OK" when there are none.
pub fn status_text(body: Option<Value>) -> String {
    let text = match body {
        Some(Value::Object(map)) => map_text(&map),
        Some(Value::Null) | None => String::new(),
        Some(other) => scalar_text(&other),
    };
    if text.trim().is_empty() { "OK".to_string() } else { text }
}
