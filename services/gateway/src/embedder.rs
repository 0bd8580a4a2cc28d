//! External embedder collaborator
//!
//! Turns a captured face image into a fixed-length feature vector. How
//! the vector is computed is out of scope; this module only defines the
//! contract and an HTTP-backed client for it.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use types::embedding::Embedding;
use types::errors::EmbedderError;

/// Produces one face embedding per image.
///
/// Exactly one face must be present; zero or several are reported as
/// distinct error kinds.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, image: &[u8]) -> Result<Embedding, EmbedderError>;
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Option<Vec<f32>>,
    error: Option<String>,
}

/// Client for an HTTP embedding service (`POST {base}/embed` with the
/// raw image body). Every call carries the configured timeout.
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEmbedder {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, image: &[u8]) -> Result<Embedding, EmbedderError> {
        let response = self
            .client
            .post(format!("{}/embed", self.base_url))
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbedderError::Timeout
                } else {
                    EmbedderError::Unavailable(e.to_string())
                }
            })?;

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbedderError::Unavailable(e.to_string()))?;

        match (body.embedding, body.error.as_deref()) {
            (Some(values), _) => Ok(Embedding::new(values)),
            (None, Some("face_not_found")) => Err(EmbedderError::FaceNotFound),
            (None, Some("multiple_faces")) => Err(EmbedderError::MultipleFaces),
            (None, Some(other)) => Err(EmbedderError::Unavailable(other.to_string())),
            (None, None) => Err(EmbedderError::Unavailable(
                "embedder returned neither embedding nor error".into(),
            )),
        }
    }
}
