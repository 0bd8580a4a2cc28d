use crate::error::AppError;
use crate::handlers::decode_data_url;
use crate::models::{RegisterRequest, RegisterResponse};
use crate::state::AppState;
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use types::errors::StoreError;
use types::identity::Identity;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let name = payload.name.trim();
    let payment_id = payload.external_payment_id.trim();
    if name.is_empty() || payment_id.is_empty() {
        return Err(AppError::BadRequest("Missing fields".into()));
    }

    let image = decode_data_url(&payload.image)?;
    let template = state.embedder.embed(&image).await?;

    // Retried registrations resolve to the already-enrolled identity.
    let enrolled = tokio::time::timeout(
        state.config.call_timeout,
        state.store.enroll(Identity::new(name, payment_id, template)),
    )
    .await
    .map_err(|_| StoreError::Timeout)??;

    tracing::info!(user = %enrolled.id, "identity enrolled");

    Ok(Json(RegisterResponse {
        status: "success",
        user_id: enrolled.id,
    }))
}
