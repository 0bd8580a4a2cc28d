//! Audit log attempt records
//!
//! One record per transfer attempt, append-only once written. Field
//! names match the persisted representation: `date`, `amount` (major
//! units), `currency`, `to`, `status`, `charge_id`, `error`.

use crate::ids::ChargeId;
use crate::money::Amount;
use chrono::Local;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Terminal status of one transfer attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttemptStatus {
    /// Ledger confirmed the charge
    Completed,
    /// Rejected before the ledger was called (bad input, no match)
    Failed,
    /// Ledger call failed or its outcome is unknown
    Error,
}

/// One audit trail entry
///
/// Never mutated or deleted once appended; insertion order is
/// chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Local time formatted `YYYY-MM-DD HH:MM:SS`
    pub date: String,
    /// Amount in decimal major units
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    /// Recipient identifier as supplied by the caller
    pub to: String,
    pub status: AttemptStatus,
    pub charge_id: Option<ChargeId>,
    pub error: Option<String>,
}

impl AttemptRecord {
    fn new(
        amount: Decimal,
        currency: impl Into<String>,
        to: impl Into<String>,
        status: AttemptStatus,
    ) -> Self {
        Self {
            date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            amount,
            currency: currency.into(),
            to: to.into(),
            status,
            charge_id: None,
            error: None,
        }
    }

    /// A confirmed charge with the ledger's charge identifier
    pub fn completed(
        amount: Amount,
        currency: impl Into<String>,
        to: impl Into<String>,
        charge_id: ChargeId,
    ) -> Self {
        let mut record = Self::new(amount.to_major(), currency, to, AttemptStatus::Completed);
        record.charge_id = Some(charge_id);
        record
    }

    /// An attempt rejected before any ledger call
    pub fn failed(
        amount: Decimal,
        currency: impl Into<String>,
        to: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let mut record = Self::new(amount, currency, to, AttemptStatus::Failed);
        record.error = Some(error.into());
        record
    }

    /// A ledger call that failed or whose outcome is unknown
    pub fn error(
        amount: Amount,
        currency: impl Into<String>,
        to: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let mut record = Self::new(amount.to_major(), currency, to, AttemptStatus::Error);
        record.error = Some(error.into());
        record
    }
}
