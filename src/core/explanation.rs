//! Ledger explanation responses arrive in several shapes: a bare list, a list
//! under one of a handful of keys, the same wrapped in `data`/`result`/
//! `payload`, or an object keyed by user id. [`ExplanationShape::detect`]
//! probes them in that order and callers only ever see the entries.

use crate::core::formatting::{MemberNames, format_contribution_description, MISSING};
use crate::core::models::{
    Contribution, ExplanationExpense, ExplanationTransfer, LedgerExplanationEntry, TransferBreakdown, UserId,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

const LIST_KEYS: [&str; 7] = ["entries", "users", "items", "explanations", "data", "result", "payload"];
const WRAPPER_KEYS: [&str; 3] = ["data", "result", "payload"];

#[derive(Clone, Debug, PartialEq)]
pub enum ExplanationShape {
    List(Vec<Value>),
    Keyed { key: &'static str, entries: Vec<Value> },
    Wrapped { key: &'static str, inner: Box<ExplanationShape> },
    ByUserId(Vec<(String, Value)>),
    Empty,
}

impl ExplanationShape {
    pub fn detect(value: &Value) -> ExplanationShape {
        match value {
            Value::Array(items) => ExplanationShape::List(items.clone()),
            Value::Object(record) => Self::detect_object(record),
            _ => ExplanationShape::Empty,
        }
    }

    fn detect_object(record: &Map<String, Value>) -> ExplanationShape {
        for key in LIST_KEYS {
            if let Some(Value::Array(entries)) = record.get(key) {
                if entries.is_empty() {
                    continue;
                }
                return ExplanationShape::Keyed {
                    key,
                    entries: entries.clone(),
                };
            }
        }

        for key in WRAPPER_KEYS {
            if let Some(Value::Object(inner)) = record.get(key) {
                let inner = Self::detect_object(inner);
                if !inner.entries().is_empty() {
                    return ExplanationShape::Wrapped {
                        key,
                        inner: Box::new(inner),
                    };
                }
            }
        }

        let keyed: Vec<(String, Value)> = record
            .iter()
            .filter(|(key, value)| value.is_object() && !WRAPPER_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let shape = ExplanationShape::ByUserId(keyed);
        if shape.entries().is_empty() {
            ExplanationShape::Empty
        } else {
            shape
        }
    }

    pub fn entries(&self) -> Vec<LedgerExplanationEntry> {
        match self {
            ExplanationShape::List(items) | ExplanationShape::Keyed { entries: items, .. } => {
                items.iter().filter_map(|item| normalize_entry(item, None)).collect()
            }
            ExplanationShape::Wrapped { inner, .. } => inner.entries(),
            ExplanationShape::ByUserId(keyed) => keyed
                .iter()
                .filter_map(|(key, item)| normalize_entry(item, key.trim().parse::<UserId>().ok()))
                .collect(),
            ExplanationShape::Empty => Vec::new(),
        }
    }
}

pub fn parse_ledger_explanation(value: &Value) -> Vec<LedgerExplanationEntry> {
    ExplanationShape::detect(value).entries()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawExplanationEntry {
    user_id: Option<Value>,
    net_balance: Option<Value>,
    expenses: Option<Vec<ExplanationExpense>>,
    contributing_expenses: Option<Vec<ExplanationExpense>>,
    transfers: Option<Vec<ExplanationTransfer>>,
    contributing_transfers: Option<Vec<ExplanationTransfer>>,
    transfers_in: Option<Vec<ExplanationTransfer>>,
    transfers_out: Option<Vec<ExplanationTransfer>>,
    contributions: Option<Vec<Contribution>>,
}

fn user_id_of(value: &Value) -> Option<UserId> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn normalize_entry(item: &Value, key_user_id: Option<UserId>) -> Option<LedgerExplanationEntry> {
    let raw: RawExplanationEntry = match serde_json::from_value(item.clone()) {
        Ok(raw) => raw,
        Err(err) => {
            warn!("Skipping unreadable ledger explanation entry: {}", err);
            return None;
        }
    };
    let user_id = raw.user_id.as_ref().and_then(user_id_of).or(key_user_id)?;

    let net_balance = raw.net_balance.and_then(|value| match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    let incoming = raw.transfers_in.unwrap_or_default();
    let outgoing = raw.transfers_out.unwrap_or_default();
    let transfers = if !incoming.is_empty() || !outgoing.is_empty() {
        TransferBreakdown::Directional { incoming, outgoing }
    } else {
        TransferBreakdown::Undirected(raw.transfers.or(raw.contributing_transfers).unwrap_or_default())
    };

    Some(LedgerExplanationEntry {
        user_id,
        net_balance,
        expenses: raw.expenses.or(raw.contributing_expenses).unwrap_or_default(),
        transfers,
        contributions: raw.contributions.unwrap_or_default(),
    })
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Short reasons behind a member's balance: expense count, transfer counts,
/// and up to two contribution descriptions.
pub fn ledger_why_parts(entry: &LedgerExplanationEntry, names: &MemberNames) -> Vec<String> {
    let mut parts = Vec::new();

    let expenses = entry.expenses.len();
    if expenses > 0 {
        parts.push(format!("{} expense{}", expenses, plural(expenses)));
    }

    match &entry.transfers {
        TransferBreakdown::Directional { incoming, outgoing } => {
            parts.push(format!(
                "{} incoming / {} outgoing transfer{}",
                incoming.len(),
                outgoing.len(),
                plural(incoming.len() + outgoing.len())
            ));
        }
        TransferBreakdown::Undirected(transfers) if !transfers.is_empty() => {
            parts.push(format!("{} transfer{}", transfers.len(), plural(transfers.len())));
        }
        _ => {}
    }

    let reasons: Vec<String> = entry
        .contributions
        .iter()
        .map(|c| format_contribution_description(c.description.as_deref(), names))
        .filter(|reason| reason != MISSING)
        .take(2)
        .collect();
    if !reasons.is_empty() {
        parts.push(reasons.join(" • "));
    }

    parts
}

/// Which member's explanation to show: keep `previous` if still listed, else
/// the current user, else the first entry.
pub fn select_explanation_user(
    entries: &[LedgerExplanationEntry],
    previous: Option<UserId>,
    current_user: Option<UserId>,
) -> Option<UserId> {
    let listed = |id: UserId| entries.iter().any(|entry| entry.user_id == id);
    previous
        .filter(|id| listed(*id))
        .or_else(|| current_user.filter(|id| listed(*id)))
        .or_else(|| entries.first().map(|entry| entry.user_id))
}
