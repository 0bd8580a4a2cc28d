//! External ledger collaborator
//!
//! Executes a charge-and-transfer given the sender's payment token, the
//! recipient account and an amount in minor units. The payment network
//! itself is out of scope; this module defines the contract and an
//! HTTP-backed client for the backend's `/charge_and_transfer` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use types::errors::LedgerError;
use types::ids::{ChargeId, RecipientId};
use types::money::Amount;

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Charge the sender and transfer to the recipient. No retries: a
    /// failed or timed-out charge is reported, never resubmitted here.
    async fn charge_and_transfer(
        &self,
        sender_token: &str,
        recipient: &RecipientId,
        amount: Amount,
    ) -> Result<ChargeId, LedgerError>;
}

#[derive(Debug, Serialize)]
struct ChargeRequest<'a> {
    sender_customer_id: &'a str,
    recipient_account_id: &'a str,
    amount_cents: i64,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    status: String,
    charge_id: Option<String>,
    error: Option<String>,
}

/// Client for the HTTP payment backend. Every call carries the
/// configured timeout; a timeout means the charge outcome is unknown.
pub struct HttpLedger {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLedger {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl Ledger for HttpLedger {
    async fn charge_and_transfer(
        &self,
        sender_token: &str,
        recipient: &RecipientId,
        amount: Amount,
    ) -> Result<ChargeId, LedgerError> {
        let request = ChargeRequest {
            sender_customer_id: sender_token,
            recipient_account_id: recipient.as_str(),
            amount_cents: amount.minor_units(),
        };

        let response = self
            .client
            .post(format!("{}/charge_and_transfer", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LedgerError::Timeout
                } else {
                    LedgerError::Unavailable(e.to_string())
                }
            })?;

        let body: ChargeResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        match (body.status.as_str(), body.charge_id) {
            ("success", Some(charge_id)) => Ok(ChargeId::new(charge_id)),
            _ => Err(LedgerError::Declined {
                detail: body.error.unwrap_or_else(|| "unknown ledger error".into()),
            }),
        }
    }
}
