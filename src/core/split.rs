use crate::core::errors::FairshareError;
use crate::core::formatting::{format_amount, parse_number};
use crate::core::models::{Expense, ExpensePayload, Member, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const EXACT_TOLERANCE: f64 = 0.01;
pub const PERCENT_TOLERANCE: f64 = 0.01;

/// Raw per-member text inputs keyed by member id.
pub type MemberInputs = HashMap<UserId, String>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    #[default]
    Equal,
    Exact,
    Percentage,
    Shares,
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SplitMode::Equal => "equal",
            SplitMode::Exact => "exact",
            SplitMode::Percentage => "percentage",
            SplitMode::Shares => "shares",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SplitMode {
    type Err = FairshareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal" => Ok(SplitMode::Equal),
            "exact" => Ok(SplitMode::Exact),
            "percentage" | "percent" => Ok(SplitMode::Percentage),
            "shares" => Ok(SplitMode::Shares),
            other => Err(FairshareError::invalid_input(
                "split",
                "Invalid split mode",
                format!("Unknown split mode '{}'", other),
            )),
        }
    }
}

/// Form state behind the add and edit expense panels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount: String,
    pub payer_user_id: Option<UserId>,
    pub split_mode: SplitMode,
    pub exact_amounts: MemberInputs,
    pub percentages: MemberInputs,
    pub shares: MemberInputs,
}

impl ExpenseDraft {
    /// Draft pre-filled from an existing expense. The split mode starts at
    /// equal; exact and share inputs are seeded from the recorded splits.
    pub fn from_expense(expense: &Expense, members: &[Member]) -> Self {
        let seed: MemberInputs = expense
            .splits
            .iter()
            .map(|split| (split.user_id, split.share_amount.clone()))
            .collect();
        ExpenseDraft {
            description: expense.description.clone(),
            amount: expense.amount.clone(),
            payer_user_id: Some(expense.payer_user_id),
            split_mode: SplitMode::Equal,
            exact_amounts: build_member_value_map(members, &seed),
            percentages: build_member_value_map(members, &MemberInputs::new()),
            shares: build_member_value_map(members, &seed),
        }
    }

    /// Keeps inputs for current members and blanks the rest.
    pub fn reseed(&mut self, members: &[Member]) {
        self.exact_amounts = build_member_value_map(members, &self.exact_amounts);
        self.percentages = build_member_value_map(members, &self.percentages);
        self.shares = build_member_value_map(members, &self.shares);
    }

    pub fn inputs_mut(&mut self, mode: SplitMode) -> Option<&mut MemberInputs> {
        match mode {
            SplitMode::Equal => None,
            SplitMode::Exact => Some(&mut self.exact_amounts),
            SplitMode::Percentage => Some(&mut self.percentages),
            SplitMode::Shares => Some(&mut self.shares),
        }
    }

    pub fn validate(&self, participants: &[UserId]) -> Result<ExpensePayload, FairshareError> {
        if self.description.trim().is_empty() {
            return Err(FairshareError::validation("Enter a description."));
        }
        let total = parse_number(&self.amount)
            .filter(|value| *value > 0.0)
            .ok_or_else(|| FairshareError::validation("Enter an amount greater than 0."))?;
        let payer_user_id = self
            .payer_user_id
            .ok_or_else(|| FairshareError::validation("Select who paid."))?;
        if participants.is_empty() {
            return Err(FairshareError::validation("Add members before recording expenses."));
        }

        let mut payload = ExpensePayload {
            description: self.description.clone(),
            amount: format_amount(total),
            payer_user_id,
            participant_user_ids: participants.to_vec(),
            shares: None,
            exact_amounts: None,
            percentages: None,
        };

        match self.split_mode {
            SplitMode::Equal => {}
            SplitMode::Exact => {
                let amounts = collect_numbers(&self.exact_amounts, participants)
                    .ok_or_else(|| FairshareError::validation("Enter an exact amount for each member."))?;
                let sum: f64 = amounts.iter().sum();
                if (sum - total).abs() > EXACT_TOLERANCE {
                    return Err(FairshareError::validation("Exact amounts must add up to the total."));
                }
                payload.exact_amounts = Some(amounts.into_iter().map(format_amount).collect());
            }
            SplitMode::Percentage => {
                let percentages = collect_numbers(&self.percentages, participants)
                    .ok_or_else(|| FairshareError::validation("Enter a percentage for each member."))?;
                let sum: f64 = percentages.iter().sum();
                if (sum - 100.0).abs() > PERCENT_TOLERANCE {
                    return Err(FairshareError::validation("Percentages must add up to 100%."));
                }
                payload.percentages = Some(percentages.into_iter().map(format_amount).collect());
            }
            SplitMode::Shares => {
                let shares = collect_share_counts(&self.shares, participants)
                    .ok_or_else(|| FairshareError::validation("Enter a share count (>= 1) for each member."))?;
                payload.shares = Some(shares);
            }
        }

        Ok(payload)
    }
}

fn collect_numbers(inputs: &MemberInputs, participants: &[UserId]) -> Option<Vec<f64>> {
    participants
        .iter()
        .map(|id| inputs.get(id).and_then(|raw| parse_number(raw)))
        .collect()
}

fn parse_share_count(raw: &str) -> Option<u32> {
    let value = parse_number(raw)?;
    if value < 1.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return None;
    }
    Some(value as u32)
}

fn collect_share_counts(inputs: &MemberInputs, participants: &[UserId]) -> Option<Vec<u32>> {
    participants
        .iter()
        .map(|id| inputs.get(id).and_then(|raw| parse_share_count(raw)))
        .collect()
}

/// One entry per member, taking the seed value when present and blank otherwise.
pub fn build_member_value_map(members: &[Member], seed: &MemberInputs) -> MemberInputs {
    members
        .iter()
        .map(|member| (member.id, seed.get(&member.id).cloned().unwrap_or_default()))
        .collect()
}

/// Part of the total not yet assigned by the per-member inputs. Unparseable
/// inputs count as zero; an unparseable total gives `None`.
pub fn remaining_amount(total: &str, amounts: &MemberInputs, ids: &[UserId]) -> Option<f64> {
    let total = parse_number(total)?;
    let assigned: f64 = ids
        .iter()
        .filter_map(|id| amounts.get(id).and_then(|raw| parse_number(raw)))
        .sum();
    Some(total - assigned)
}
