//! Enrolled identity records
//!
//! An identity ties a display name and an external payment token to a
//! stored face template. The identity store exclusively owns these
//! records; nothing else mutates them.

use crate::embedding::Embedding;
use crate::ids::UserId;
use serde::{Deserialize, Serialize};

/// An enrolled identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique, immutable id, derived from `payment_token`
    pub id: UserId,
    pub display_name: String,
    /// Token identifying the paying account on the external ledger
    pub payment_token: String,
    /// Stored face template; dimensionality is fixed per store
    pub template: Embedding,
}

impl Identity {
    /// Create a new identity; the id is derived from the payment token
    pub fn new(
        display_name: impl Into<String>,
        payment_token: impl Into<String>,
        template: Embedding,
    ) -> Self {
        let payment_token = payment_token.into();
        Self {
            id: UserId::from_payment_token(payment_token.clone()),
            display_name: display_name.into(),
            payment_token,
            template,
        }
    }
}
