//! In-memory identity store
//!
//! Backs tests and single-process deployments. Same contract as the
//! file-backed store: dimension fixed at construction, idempotent
//! enroll, snapshot reads.

use crate::IdentityStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use types::errors::StoreError;
use types::identity::Identity;
use types::ids::UserId;

pub struct MemoryStore {
    dim: usize,
    identities: RwLock<HashMap<UserId, Identity>>,
}

impl MemoryStore {
    /// Create a store for templates of dimensionality `dim`.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            identities: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn enroll(&self, identity: Identity) -> Result<Identity, StoreError> {
        if identity.template.dim() != self.dim {
            return Err(StoreError::Dimension {
                expected: self.dim,
                got: identity.template.dim(),
            });
        }

        let mut identities = self.identities.write().await;
        if let Some(existing) = identities.get(&identity.id) {
            return Ok(existing.clone());
        }
        identities.insert(identity.id.clone(), identity.clone());
        Ok(identity)
    }

    async fn all_identities(&self) -> Result<Vec<Identity>, StoreError> {
        let identities = self.identities.read().await;
        Ok(identities.values().cloned().collect())
    }
}
