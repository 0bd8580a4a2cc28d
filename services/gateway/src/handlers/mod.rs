pub mod pay;
pub mod register;
pub mod verify;

use crate::error::AppError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Decode a `data:image/...;base64,<payload>` URL (or a bare base64
/// string) into image bytes.
pub(crate) fn decode_data_url(image: &str) -> Result<Vec<u8>, AppError> {
    let payload = image.rsplit_once(',').map_or(image, |(_, data)| data);
    BASE64
        .decode(payload.trim())
        .map_err(|e| AppError::BadRequest(format!("invalid image data: {e}")))
}
