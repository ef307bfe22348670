use crate::core::formatting::{format_amount, parse_number};
use crate::core::models::SettlementTransfer;
use std::collections::HashSet;
use std::fmt;

/// Identity of a suggested transfer: both member ids plus the amount rounded
/// to cents, so `10` and `10.004` share a key while `10.01` does not.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransferKey(String);

impl TransferKey {
    pub fn of(transfer: &SettlementTransfer) -> Self {
        let amount = parse_number(&transfer.amount).unwrap_or(0.0);
        TransferKey(format!(
            "{}-{}-{}",
            transfer.from_user_id,
            transfer.to_user_id,
            format_amount(amount)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransferKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Local guard against confirming the same transfer twice. Advisory only:
/// the confirmation id is what makes the server side idempotent.
#[derive(Clone, Debug, Default)]
pub struct ConfirmationTracker {
    confirming: HashSet<TransferKey>,
    paid: HashSet<TransferKey>,
}

impl ConfirmationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` in flight. Returns false when it is already in flight or
    /// already paid, in which case nothing should be sent.
    pub fn begin(&mut self, key: &TransferKey) -> bool {
        if self.confirming.contains(key) || self.paid.contains(key) {
            return false;
        }
        self.confirming.insert(key.clone());
        true
    }

    pub fn succeed(&mut self, key: &TransferKey) {
        self.confirming.remove(key);
        self.paid.insert(key.clone());
    }

    pub fn fail(&mut self, key: &TransferKey) {
        self.confirming.remove(key);
    }

    pub fn is_confirming(&self, key: &TransferKey) -> bool {
        self.confirming.contains(key)
    }

    pub fn is_paid(&self, key: &TransferKey) -> bool {
        self.paid.contains(key)
    }

    /// Whether the confirm action for this transfer should be offered.
    pub fn can_confirm(&self, key: &TransferKey) -> bool {
        !self.is_confirming(key) && !self.is_paid(key)
    }
}
