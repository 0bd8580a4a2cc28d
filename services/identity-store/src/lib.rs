//! Durable repository of enrolled identities
//!
//! The store exclusively owns identity records. Template dimensionality
//! is fixed when a store is initialized, not per record. Enrollment is
//! idempotent on id (insert, ignore conflict) so retried registration
//! requests are harmless.

pub mod file;
pub mod memory;

use async_trait::async_trait;
use types::errors::StoreError;
use types::identity::Identity;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Repository contract required by the payment core.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Enroll an identity. Re-enrolling an already-present id is a
    /// no-op success returning the stored record, not an error.
    async fn enroll(&self, identity: Identity) -> Result<Identity, StoreError>;

    /// A point-in-time snapshot of all enrolled identities, not a live
    /// view: enrollments racing this call may be absent from it.
    async fn all_identities(&self) -> Result<Vec<Identity>, StoreError>;
}
