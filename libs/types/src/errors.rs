//! Error taxonomy for the payment pipeline
//!
//! Closed error-kind enumerations using thiserror. Every external call
//! site (embedder, ledger, storage) declares which kinds it can produce;
//! nothing is surfaced as a catch-all.

use crate::embedding::DimensionMismatch;
use thiserror::Error;

/// Errors from the external embedder collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmbedderError {
    #[error("no face found in image")]
    FaceNotFound,

    #[error("multiple faces found in image")]
    MultipleFaces,

    #[error("embedder call timed out")]
    Timeout,

    #[error("embedder unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the external ledger collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger rejected the charge (declined card, bad account, ...)
    #[error("charge declined: {detail}")]
    Declined { detail: String },

    /// The ledger call exceeded its bound; the charge outcome is unknown
    /// and must never be assumed successful.
    #[error("ledger call timed out, charge status unknown")]
    Timeout,

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Errors from identity resolution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// Probe/template dimensionality disagreement, a defect rather than bad user input
    #[error(transparent)]
    Dimension(#[from] DimensionMismatch),
}

/// Errors from the identity store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("identity storage unavailable: {0}")]
    Storage(String),

    #[error("template dimension mismatch: store requires {expected}, got {got}")]
    Dimension { expected: usize, got: usize },

    #[error("identity store call timed out")]
    Timeout,
}

/// Errors from the audit log
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("audit log storage unavailable: {0}")]
    Storage(String),

    #[error("audit log write timed out")]
    Timeout,

    #[error("audit log writer has shut down")]
    Closed,
}

/// Outcome of one failed transfer attempt, as seen by the caller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Embedder(#[from] EmbedderError),

    #[error("Face not recognized")]
    FaceNotRecognized,

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_timeout_message_mentions_unknown_status() {
        assert!(LedgerError::Timeout.to_string().contains("status unknown"));
    }

    #[test]
    fn test_pay_error_from_match_error() {
        let err: PayError = MatchError::Dimension(DimensionMismatch {
            expected: 128,
            got: 64,
        })
        .into();
        assert!(matches!(err, PayError::Match(_)));
        assert!(err.to_string().contains("128"));
    }

    #[test]
    fn test_face_not_recognized_is_caller_facing_text() {
        assert_eq!(PayError::FaceNotRecognized.to_string(), "Face not recognized");
    }
}
