use crate::error::AppError;
use crate::handlers::decode_data_url;
use crate::models::{PayRequest, PayResponse};
use crate::state::AppState;
use axum::{Json, extract::State, extract::rejection::JsonRejection};

pub async fn pay(
    State(state): State<AppState>,
    payload: Result<Json<PayRequest>, JsonRejection>,
) -> Result<Json<PayResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let image = decode_data_url(&payload.image)?;
    let probe = state.embedder.embed(&image).await?;

    let outcome = state
        .authorizer
        .authorize(payload.recipient_id.trim(), payload.amount, &probe)
        .await?;

    Ok(Json(PayResponse {
        status: "success",
        charge_id: outcome.charge_id,
        message: outcome.message,
    }))
}
