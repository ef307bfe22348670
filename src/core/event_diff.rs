//! Turns audit event payloads into readable text for the history view.
//!
//! A payload either carries a `before`/`after` snapshot pair of an expense,
//! which is diffed into per-member split changes, per-member owes changes and
//! raw field changes, or it is a flat object listed field by field.

use crate::core::formatting::{
    MISSING, MemberNames, field_label, format_money, format_money_text, format_signed_money, member_label,
    owes_label, parse_number,
};
use crate::core::models::UserId;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Field holding the expense's own id. Never reported as a change.
pub const INTERNAL_ID_FIELD: &str = "expenseId";
pub const NO_CHANGES: &str = "No dispute-impacting changes found.";
pub const NO_DETAILS: &str = "No additional details";

const CHANGE_EPSILON: f64 = 0.005;

type Record = Map<String, Value>;
type AmountsByUser = BTreeMap<UserId, f64>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventDiff {
    pub split_changes: Vec<String>,
    pub owes_changes: Vec<String>,
    pub field_changes: Vec<String>,
}

impl EventDiff {
    pub fn is_empty(&self) -> bool {
        self.split_changes.is_empty() && self.owes_changes.is_empty() && self.field_changes.is_empty()
    }

    pub fn render(&self) -> String {
        if self.is_empty() {
            return NO_CHANGES.to_string();
        }
        let mut lines = Vec::new();
        let sections = [
            ("Split changes per person:", &self.split_changes),
            ("Owes changes:", &self.owes_changes),
            ("Field changes:", &self.field_changes),
        ];
        for (title, section) in sections {
            if !section.is_empty() {
                lines.push(title.to_string());
                lines.extend(section.iter().cloned());
            }
        }
        lines.join("\n")
    }
}

/// Renders an event payload. Text that is not a JSON object is returned as is.
pub fn format_event_payload(payload: &str, names: &MemberNames) -> String {
    let Ok(Value::Object(parsed)) = serde_json::from_str::<Value>(payload) else {
        return payload.to_string();
    };

    let before = snapshot(&parsed, "before", "Before");
    let after = snapshot(&parsed, "after", "After");
    if let (Some(before), Some(after)) = (before, after) {
        return diff_snapshots(&before, &after, names).render();
    }

    let lines = flat_lines(&parsed, names);
    if lines.is_empty() {
        NO_DETAILS.to_string()
    } else {
        lines.join("\n")
    }
}

pub fn diff_snapshots(before: &Record, after: &Record, names: &MemberNames) -> EventDiff {
    let before_value = Value::Object(before.clone());
    let after_value = Value::Object(after.clone());
    EventDiff {
        split_changes: split_diff_lines(before, after, names),
        owes_changes: owes_diff_lines(before, after, names),
        field_changes: field_diff_lines(Some(&before_value), Some(&after_value), names, &mut Vec::new()),
    }
}

/// Snapshot under `key` (or its capitalized twin), given either as an object
/// or as a string of JSON encoding one.
fn snapshot(parsed: &Record, key: &str, alt_key: &str) -> Option<Record> {
    let value = parsed
        .get(key)
        .filter(|v| !v.is_null())
        .or_else(|| parsed.get(alt_key))?;
    match value {
        Value::Object(record) => Some(record.clone()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(record)) => Some(record),
            _ => None,
        },
        _ => None,
    }
}

fn flat_lines(parsed: &Record, names: &MemberNames) -> Vec<String> {
    let mut lines = Vec::new();
    for (key, value) in parsed.iter().filter(|(key, _)| key.as_str() != INTERNAL_ID_FIELD) {
        let label = field_label(key);
        match strip_internal_ids(value) {
            Value::Object(nested) => {
                if nested.is_empty() {
                    lines.push(format!("{}: {}", label, MISSING));
                }
                for (nested_key, nested_value) in &nested {
                    lines.push(format!(
                        "{} {}: {}",
                        label,
                        field_label(nested_key),
                        format_field_value(nested_key, Some(nested_value), names)
                    ));
                }
            }
            _ => lines.push(format!("{}: {}", label, format_field_value(key, Some(value), names))),
        }
    }
    lines
}

pub fn strip_internal_ids(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(strip_internal_ids).collect()),
        Value::Object(record) => Value::Object(
            record
                .iter()
                .filter(|(key, _)| key.as_str() != INTERNAL_ID_FIELD)
                .map(|(key, nested)| (key.clone(), strip_internal_ids(nested)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Structural equality where `10` and `10.0` are the same number.
fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| json_equal(x, y)))
        }
        _ => a == b,
    }
}

fn field_diff_lines(
    before: Option<&Value>,
    after: Option<&Value>,
    names: &MemberNames,
    path: &mut Vec<String>,
) -> Vec<String> {
    if let (Some(Value::Object(b)), Some(Value::Object(a))) = (before, after) {
        let mut keys: Vec<&String> = b.keys().collect();
        keys.extend(a.keys().filter(|key| !b.contains_key(*key)));

        let mut lines = Vec::new();
        for key in keys.into_iter().filter(|key| key.as_str() != INTERNAL_ID_FIELD) {
            path.push(key.clone());
            lines.extend(field_diff_lines(b.get(key), a.get(key), names, path));
            path.pop();
        }
        return lines;
    }

    let unchanged = match (before, after) {
        (None, None) => true,
        (Some(b), Some(a)) => json_equal(&strip_internal_ids(b), &strip_internal_ids(a)),
        _ => false,
    };
    if unchanged {
        return Vec::new();
    }

    let leaf_key = path.last().map(String::as_str).unwrap_or("value");
    let label = if path.is_empty() {
        "Value".to_string()
    } else {
        path.iter().map(|segment| field_label(segment)).collect::<Vec<_>>().join(" ")
    };
    vec![format!(
        "{}: {} -> {}",
        label,
        format_field_value(leaf_key, before, names),
        format_field_value(leaf_key, after, names)
    )]
}

fn number_text(value: &serde_json::Number) -> String {
    match value.as_f64() {
        Some(f) if value.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => value.to_string(),
    }
}

fn value_to_user_id(value: &Value) -> Option<UserId> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as UserId)),
        Value::String(s) => s.trim().parse::<UserId>().ok(),
        _ => None,
    }
}

fn resolve_user(value: &Value, names: &MemberNames) -> String {
    match value_to_user_id(value) {
        Some(user_id) => member_label(names, user_id),
        None => match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

/// Formats one field value according to what its key names.
pub fn format_field_value(key: &str, value: Option<&Value>, names: &MemberNames) -> String {
    let value = match value {
        None | Some(Value::Null) => return MISSING.to_string(),
        Some(value) => value,
    };
    let lower_key = key.to_lowercase();

    if lower_key.contains("amount") {
        match value {
            Value::Number(n) => {
                if let Some(f) = n.as_f64() {
                    return format_money(f);
                }
            }
            Value::String(s) => return format_money_text(Some(s)),
            _ => {}
        }
    }

    if lower_key.ends_with("userid") && matches!(value, Value::Number(_) | Value::String(_)) {
        return resolve_user(value, names);
    }

    if lower_key.ends_with("userids") {
        if let Value::Array(items) = value {
            return items
                .iter()
                .map(|item| match item {
                    Value::Number(_) | Value::String(_) => resolve_user(item, names),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ");
        }
    }

    match value {
        Value::Object(_) | Value::Array(_) => strip_internal_ids(value).to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        other => other.to_string(),
    }
}

fn value_to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// First present, non-null value among `keys`.
fn first_present<'a>(record: &'a Record, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

fn splits_array_shares(record: &Record) -> AmountsByUser {
    let mut shares = AmountsByUser::new();
    if let Some(Value::Array(splits)) = record.get("splits") {
        for split in splits {
            let Value::Object(split) = split else { continue };
            let user_id = first_present(split, &["userId", "user_id", "memberId", "member_id"]).and_then(value_to_user_id);
            let amount = first_present(split, &["shareAmount", "share_amount", "amount", "value", "share"])
                .and_then(value_to_number);
            if let (Some(user_id), Some(amount)) = (user_id, amount) {
                shares.insert(user_id, amount);
            }
        }
    }
    shares
}

fn parallel_list<'a>(record: &'a Record, key: &str, participants: &[UserId]) -> Option<&'a Vec<Value>> {
    match record.get(key) {
        Some(Value::Array(list)) if list.len() == participants.len() => Some(list),
        _ => None,
    }
}

/// Each member's share of the expense, from the first representation in the
/// snapshot that yields anything.
pub fn split_shares_by_user(record: &Record) -> Option<AmountsByUser> {
    let from_splits = splits_array_shares(record);
    if !from_splits.is_empty() {
        return Some(from_splits);
    }

    let participants: Vec<UserId> = match record.get("participantUserIds") {
        Some(Value::Array(ids)) => ids.iter().filter_map(value_to_user_id).collect(),
        _ => Vec::new(),
    };
    let total = record.get("amount").and_then(value_to_number);

    if let Some(exact) = parallel_list(record, "exactAmounts", &participants) {
        let shares: AmountsByUser = participants
            .iter()
            .zip(exact)
            .filter_map(|(user_id, amount)| value_to_number(amount).map(|a| (*user_id, a)))
            .collect();
        if !shares.is_empty() {
            return Some(shares);
        }
    }

    if let (Some(total), Some(percentages)) = (total, parallel_list(record, "percentages", &participants)) {
        let shares: AmountsByUser = participants
            .iter()
            .zip(percentages)
            .filter_map(|(user_id, pct)| value_to_number(pct).map(|p| (*user_id, total * p / 100.0)))
            .collect();
        if !shares.is_empty() {
            return Some(shares);
        }
    }

    if let (Some(total), Some(counts)) = (total, parallel_list(record, "shares", &participants)) {
        let counts: Vec<Option<f64>> = counts.iter().map(value_to_number).collect();
        let total_shares: f64 = counts.iter().flatten().sum();
        if total_shares > 0.0 {
            let shares: AmountsByUser = participants
                .iter()
                .zip(&counts)
                .filter_map(|(user_id, count)| count.map(|c| (*user_id, total * c / total_shares)))
                .collect();
            if !shares.is_empty() {
                return Some(shares);
            }
        }
    }

    if let Some(Value::Object(by_user)) = first_present(record, &["splitByUserId", "sharesByUserId"]) {
        let shares: AmountsByUser = by_user
            .iter()
            .filter_map(|(user_id, amount)| {
                let user_id = user_id.trim().parse::<UserId>().ok()?;
                value_to_number(amount).map(|a| (user_id, a))
            })
            .collect();
        if !shares.is_empty() {
            return Some(shares);
        }
    }

    None
}

/// Net owed per member for one expense: the payer is credited the full
/// amount, every member is charged their share.
pub fn expense_owes_by_user(record: &Record) -> Option<AmountsByUser> {
    let payer = record.get("payerUserId").and_then(value_to_user_id)?;
    let amount = record.get("amount").and_then(value_to_number)?;
    let shares = split_shares_by_user(record)?;

    let mut owes = AmountsByUser::new();
    owes.insert(payer, -amount);
    for (user_id, share) in shares {
        *owes.entry(user_id).or_insert(0.0) += share;
    }
    Some(owes)
}

fn per_member_lines(
    before: &AmountsByUser,
    after: &AmountsByUser,
    names: &MemberNames,
    describe: impl Fn(f64) -> String,
) -> Vec<String> {
    let user_ids: BTreeSet<UserId> = before.keys().chain(after.keys()).copied().collect();
    user_ids
        .into_iter()
        .filter_map(|user_id| {
            let b = before.get(&user_id).copied().unwrap_or(0.0);
            let a = after.get(&user_id).copied().unwrap_or(0.0);
            if (b - a).abs() < CHANGE_EPSILON {
                return None;
            }
            Some(format!(
                "{}: {} -> {} (delta {})",
                member_label(names, user_id),
                describe(b),
                describe(a),
                format_signed_money(a - b)
            ))
        })
        .collect()
}

fn split_diff_lines(before: &Record, after: &Record, names: &MemberNames) -> Vec<String> {
    match (split_shares_by_user(before), split_shares_by_user(after)) {
        (Some(b), Some(a)) => per_member_lines(&b, &a, names, format_money),
        _ => Vec::new(),
    }
}

fn owes_diff_lines(before: &Record, after: &Record, names: &MemberNames) -> Vec<String> {
    match (expense_owes_by_user(before), expense_owes_by_user(after)) {
        (Some(b), Some(a)) => per_member_lines(&b, &a, names, owes_label),
        _ => Vec::new(),
    }
}
