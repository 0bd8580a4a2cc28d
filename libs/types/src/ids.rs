//! Identifier types for payment entities
//!
//! Ids here are not generated: they are derived from the external
//! ledger's identifiers, so the ledger token functionally determines
//! the user id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Required prefix for recipient account identifiers on the external ledger.
pub const RECIPIENT_PREFIX: &str = "acct_";

/// Unique identifier of an enrolled user
///
/// Derived from the user's external payment token at enrollment time
/// and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Derive a user id from the external payment token
    pub fn from_payment_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recipient account identifier on the external ledger
///
/// Format: `acct_` followed by the ledger-assigned suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientId(String);

impl RecipientId {
    /// Try to create a RecipientId, returning None if the prefix is missing
    pub fn try_new(raw: impl Into<String>) -> Option<Self> {
        let s = raw.into();
        if s.len() > RECIPIENT_PREFIX.len() && s.starts_with(RECIPIENT_PREFIX) {
            Some(Self(s))
        } else {
            None
        }
    }

    /// Get the account identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Charge identifier assigned by the external ledger
///
/// Opaque to this system; recorded verbatim in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChargeId(String);

impl ChargeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChargeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
