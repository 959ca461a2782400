//! Cryptographic primitives for MeltVault.
//!
//! This module provides:
//! - The secure random source and salt generation (`entropy`)
//! - Salted SHA-256 credential digests with constant-time comparison (`digest`)
//! - Random key generation for payloads (`keygen`)

pub mod digest;
pub mod entropy;
pub mod keygen;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{credential_digest, generate_salt, OsEntropy, ...};
pub use digest::{credential_digest, digests_match, DIGEST_LEN};
pub use entropy::{generate_salt, EntropySource, OsEntropy, SALT_LEN};
pub use keygen::{generate_key, DEFAULT_KEY_BITS};
