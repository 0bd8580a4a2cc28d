//! Types library for the face-gated payment system
//!
//! This library provides all core type definitions shared across the
//! services, ensuring type safety and a closed error taxonomy.
//!
//! # Modules
//! - `ids`: Identifiers (UserId, RecipientId, ChargeId)
//! - `embedding`: Fixed-dimension face feature vectors
//! - `money`: Minor-unit amounts with decimal major-unit conversion
//! - `identity`: Enrolled identity records
//! - `record`: Audit log attempt records
//! - `errors`: Error taxonomy

pub mod embedding;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod money;
pub mod record;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::embedding::*;
    pub use crate::errors::*;
    pub use crate::identity::*;
    pub use crate::ids::*;
    pub use crate::money::*;
    pub use crate::record::*;
}
