//! FacePay gateway
//!
//! HTTP surface of the face-gated payment system plus the transfer
//! authorization pipeline. External collaborators (embedder, ledger)
//! sit behind traits with HTTP-backed implementations.

pub mod authorizer;
pub mod config;
pub mod embedder;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod router;
pub mod state;
