//! API request and response bodies

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::{ChargeId, UserId};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub external_payment_id: String,
    /// base64 data URL of the captured face image
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub status: &'static str,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyRequest {
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    pub recipient_id: String,
    /// Decimal major units; accepted as a JSON number or string
    pub amount: Decimal,
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayResponse {
    pub status: &'static str,
    pub charge_id: ChargeId,
    pub message: String,
}
