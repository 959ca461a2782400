//! Vault module — the one-strike sealed container.
//!
//! This module provides:
//! - The `Payload` secret-bytes type (`payload`)
//! - The `RetrievalPolicy` for correct attempts (`policy`)
//! - The `Vault` itself with its seal/unlock/wipe protocol (`store`)

pub mod payload;
pub mod policy;
pub mod store;

// Re-export the most commonly used items.
pub use payload::Payload;
pub use policy::RetrievalPolicy;
pub use store::{SealOptions, Vault, VaultState};
