use crate::core::models::UserId;
use chrono::{DateTime, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Member id to display name.
pub type MemberNames = HashMap<UserId, String>;

pub const MISSING: &str = "—";

static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));
static USER_REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)user\s+#?(\d+)").expect("valid regex"));

/// Parses user-typed or API-sent decimal text. Blank and non-finite input is `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Rounds to whole cents, halves away from zero: `10.125` -> `10.13`.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn format_amount(value: f64) -> String {
    format!("{:.2}", round_cents(value))
}

pub fn format_money(value: f64) -> String {
    format!("${}", format_amount(value))
}

/// Money from raw text: numeric text gets two decimals, blank or missing text
/// becomes an em-dash, anything else is shown as typed.
pub fn format_money_text(raw: Option<&str>) -> String {
    match raw {
        None => MISSING.to_string(),
        Some(text) if text.trim().is_empty() => MISSING.to_string(),
        Some(text) => match parse_number(text) {
            Some(value) => format_money(value),
            None => format!("${}", text),
        },
    }
}

pub fn format_signed_money(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "-" };
    format!("{}${}", sign, format_amount(value.abs()))
}

pub fn owes_label(value: f64) -> String {
    if value.abs() < 0.005 {
        "settled".to_string()
    } else if value > 0.0 {
        format!("owes {}", format_money(value))
    } else {
        format!("is owed {}", format_money(value.abs()))
    }
}

/// `2024-03-01T12:30:00Z` -> `2024-03-01 12:30`. Timestamps without an
/// offset are taken as they are; anything unparseable is shown verbatim.
pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return MISSING.to_string();
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(parsed) => parsed.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn member_label(names: &MemberNames, user_id: UserId) -> String {
    names
        .get(&user_id)
        .cloned()
        .unwrap_or_else(|| format!("User #{}", user_id))
}

/// `payerUserId` -> `Payer User Id`, `share_amount` -> `Share amount`.
pub fn field_label(key: &str) -> String {
    let spaced = CAMEL_BOUNDARY.replace_all(key, "$1 $2").replace('_', " ");
    let trimmed = spaced.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        None => "Details".to_string(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Replaces "user 3" / "User #3" mentions with member names.
pub fn format_contribution_description(description: Option<&str>, names: &MemberNames) -> String {
    let Some(text) = description.filter(|text| !text.trim().is_empty()) else {
        return MISSING.to_string();
    };
    USER_REFERENCE
        .replace_all(text, |caps: &Captures| match caps[1].parse::<UserId>() {
            Ok(user_id) => member_label(names, user_id),
            Err(_) => format!("user {}", &caps[1]),
        })
        .into_owned()
}

fn has_wildcard(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

fn wildcard_regex(pattern: &str) -> Option<Regex> {
    let mut expr = String::from("(?i)^");
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).ok()
}

/// Group-name filter: `*`/`?` patterns match the whole name, plain text is a
/// substring match. Both ignore case; a blank pattern matches everything.
pub fn matches_group_name(name: &str, pattern: &str) -> bool {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return true;
    }
    if has_wildcard(pattern) {
        return wildcard_regex(pattern).is_some_and(|re| re.is_match(name));
    }
    name.to_lowercase().contains(&pattern.to_lowercase())
}
