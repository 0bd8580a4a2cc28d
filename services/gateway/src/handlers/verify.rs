use crate::error::AppError;
use crate::handlers::decode_data_url;
use crate::models::{VerifyRequest, VerifyResponse};
use crate::state::AppState;
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use match_engine::Resolution;
use types::errors::StoreError;

pub async fn verify(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let image = decode_data_url(&payload.image)?;
    let probe = state.embedder.embed(&image).await?;

    let candidates =
        tokio::time::timeout(state.config.call_timeout, state.store.all_identities())
            .await
            .map_err(|_| StoreError::Timeout)??;
    match state.matcher.resolve(&probe, &candidates) {
        Ok(Resolution::Match(identity)) => {
            tracing::info!(user = %identity.id, "face verified");
            Ok(Json(VerifyResponse { status: "success" }))
        }
        Ok(Resolution::NoMatch) => Err(AppError::Unauthorized("Face not recognized".into())),
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(e))),
    }
}
