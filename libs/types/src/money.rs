//! Money amounts
//!
//! The external API speaks decimal major currency units (e.g. pounds);
//! everything past the gateway boundary uses integer minor units
//! (pence). Uses rust_decimal for the conversion so no floating-point
//! error can change the charged amount.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Minor units per major unit (pence per pound)
const MINOR_PER_MAJOR: i64 = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount must be greater than zero, got {0}")]
    NotPositive(String),

    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

/// A strictly positive amount in integer minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Create from integer minor units; rejects zero and negatives
    pub fn from_minor(minor: i64) -> Result<Self, AmountError> {
        if minor <= 0 {
            return Err(AmountError::NotPositive(minor.to_string()));
        }
        Ok(Self(minor))
    }

    /// Convert from decimal major units, rounding half-up to whole
    /// minor units (`round(amount * 100)`).
    pub fn from_major(major: Decimal) -> Result<Self, AmountError> {
        let minor = (major * Decimal::from(MINOR_PER_MAJOR))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let minor = minor
            .to_i64()
            .ok_or_else(|| AmountError::OutOfRange(major.to_string()))?;
        Self::from_minor(minor)
    }

    /// The amount in integer minor units
    pub fn minor_units(&self) -> i64 {
        self.0
    }

    /// The amount in decimal major units (for audit records)
    pub fn to_major(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_major())
    }
}
