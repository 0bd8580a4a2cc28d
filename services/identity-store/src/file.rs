//! File-backed identity store
//!
//! Identities are kept in memory and persisted as an append-only stream
//! of checksummed binary frames, one per enrollment:
//!
//! ```text
//! [body_len: u32][payload: bincode(Identity)][checksum: u32 (CRC32C over payload)]
//! ```
//!
//! Templates travel inside the payload as fixed-width little-endian
//! f32 arrays (bincode `Vec<f32>`), never as strings. Dimensionality is
//! validated against the store's configured D on every load, not
//! assumed.

use crate::IdentityStore;
use async_trait::async_trait;
use crc32c::crc32c;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use types::errors::StoreError;
use types::identity::Identity;
use types::ids::UserId;

pub struct FileStore {
    dim: usize,
    path: PathBuf,
    identities: RwLock<HashMap<UserId, Identity>>,
}

impl FileStore {
    /// Open a store for templates of dimensionality `dim`, loading any
    /// previously enrolled identities from `path`.
    pub fn open(path: impl Into<PathBuf>, dim: usize) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        let (identities, intact_len) = Self::load(&path, dim)?;

        // Drop any torn tail so the next enroll appends directly after
        // the last intact frame.
        match fs::metadata(&path) {
            Ok(meta) if meta.len() > intact_len => {
                let file = fs::OpenOptions::new()
                    .write(true)
                    .open(&path)
                    .map_err(|e| StoreError::Storage(e.to_string()))?;
                file.set_len(intact_len)
                    .map_err(|e| StoreError::Storage(e.to_string()))?;
            }
            _ => {}
        }

        Ok(Self {
            dim,
            path,
            identities: RwLock::new(identities),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all intact identities, returning them with the byte length
    /// of the intact prefix.
    fn load(path: &Path, dim: usize) -> Result<(HashMap<UserId, Identity>, u64), StoreError> {
        let mut identities = HashMap::new();
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok((identities, 0)),
            Err(e) => return Err(StoreError::Storage(e.to_string())),
        };

        let mut pos = 0;
        while pos < data.len() {
            let Some((identity, consumed)) = Self::decode_frame(&data[pos..]) else {
                // Torn tail from a crash during enroll; the intact
                // prefix is the store's contents.
                tracing::warn!(
                    path = %path.display(),
                    offset = pos,
                    "identity file tail unreadable, loading intact prefix"
                );
                break;
            };
            if identity.template.dim() != dim {
                return Err(StoreError::Dimension {
                    expected: dim,
                    got: identity.template.dim(),
                });
            }
            identities.insert(identity.id.clone(), identity);
            pos += consumed;
        }
        Ok((identities, pos as u64))
    }

    fn decode_frame(data: &[u8]) -> Option<(Identity, usize)> {
        if data.len() < 4 {
            return None;
        }
        let body_len = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if body_len < 4 || body_len > 10_000_000 {
            return None;
        }
        let total = 4 + body_len;
        if data.len() < total {
            return None;
        }
        let payload = &data[4..total - 4];
        let checksum = u32::from_le_bytes(data[total - 4..total].try_into().ok()?);
        if crc32c(payload) != checksum {
            return None;
        }
        let identity: Identity = bincode::deserialize(payload).ok()?;
        Some((identity, total))
    }

    fn encode_frame(identity: &Identity) -> Result<Vec<u8>, StoreError> {
        let payload =
            bincode::serialize(identity).map_err(|e| StoreError::Storage(e.to_string()))?;
        let body_len = (payload.len() + 4) as u32;
        let mut frame = Vec::with_capacity(4 + payload.len() + 4);
        frame.extend_from_slice(&body_len.to_le_bytes());
        frame.extend_from_slice(&payload);
        frame.extend_from_slice(&crc32c(&payload).to_le_bytes());
        Ok(frame)
    }
}

#[async_trait]
impl IdentityStore for FileStore {
    async fn enroll(&self, identity: Identity) -> Result<Identity, StoreError> {
        if identity.template.dim() != self.dim {
            return Err(StoreError::Dimension {
                expected: self.dim,
                got: identity.template.dim(),
            });
        }

        // The write lock serializes concurrent enrollments, giving the
        // append insert-level atomicity.
        let mut identities = self.identities.write().await;
        if let Some(existing) = identities.get(&identity.id) {
            return Ok(existing.clone());
        }

        let frame = Self::encode_frame(&identity)?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        file.write_all(&frame)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        file.sync_all()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        identities.insert(identity.id.clone(), identity.clone());
        Ok(identity)
    }

    async fn all_identities(&self) -> Result<Vec<Identity>, StoreError> {
        let identities = self.identities.read().await;
        Ok(identities.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use types::embedding::Embedding;

    fn identity(token: &str, template: Vec<f32>) -> Identity {
        Identity::new("Test User", token, Embedding::new(template))
    }

    #[tokio::test]
    async fn test_enroll_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("identities.bin");

        let store = FileStore::open(&path, 3).unwrap();
        store.enroll(identity("cus_a", vec![0.1, 0.2, 0.3])).await.unwrap();
        store.enroll(identity("cus_b", vec![1.0, 2.0, 3.0])).await.unwrap();
        drop(store);

        let store = FileStore::open(&path, 3).unwrap();
        let mut all = store.all_identities().await.unwrap();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id.as_str(), "cus_a");
        assert_eq!(all[0].template, Embedding::new(vec![0.1, 0.2, 0.3]));
    }

    #[tokio::test]
    async fn test_dimension_validated_at_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("identities.bin");

        let store = FileStore::open(&path, 3).unwrap();
        store.enroll(identity("cus_a", vec![0.0; 3])).await.unwrap();
        drop(store);

        // Reopening with a different configured D must fail loudly.
        let err = FileStore::open(&path, 4).err().unwrap();
        assert_eq!(
            err,
            StoreError::Dimension {
                expected: 4,
                got: 3
            }
        );
    }

    #[tokio::test]
    async fn test_reenroll_same_id_is_noop_on_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("identities.bin");

        let store = FileStore::open(&path, 2).unwrap();
        store.enroll(identity("cus_a", vec![0.0, 0.0])).await.unwrap();
        let size_after_first = fs::metadata(&path).unwrap().len();

        store.enroll(identity("cus_a", vec![5.0, 5.0])).await.unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), size_after_first);
    }

    #[tokio::test]
    async fn test_torn_tail_loads_intact_prefix() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("identities.bin");

        let store = FileStore::open(&path, 2).unwrap();
        store.enroll(identity("cus_a", vec![0.0, 0.0])).await.unwrap();
        store.enroll(identity("cus_b", vec![1.0, 1.0])).await.unwrap();
        drop(store);

        let data = fs::read(&path).unwrap();
        fs::write(&path, &data[..data.len() - 3]).unwrap();

        let store = FileStore::open(&path, 2).unwrap();
        let all = store.all_identities().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id.as_str(), "cus_a");

        // The torn bytes were truncated away, so a fresh enrollment is
        // readable on the next load.
        store.enroll(identity("cus_c", vec![2.0, 2.0])).await.unwrap();
        drop(store);
        let store = FileStore::open(&path, 2).unwrap();
        assert_eq!(store.all_identities().await.unwrap().len(), 2);
    }
}
