//! Salted credential digests.
//!
//! The vault never keeps the password.  It keeps
//! `SHA-256(password || salt)` and compares later attempts against it
//! with a constant-time equality check, so the running time does not
//! depend on where the first differing byte sits.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Length of a credential digest in bytes (SHA-256).
pub const DIGEST_LEN: usize = 32;

/// Compute `SHA-256(password || salt)`.
pub fn credential_digest(password: &[u8], salt: &[u8]) -> [u8; DIGEST_LEN] {
    let hash = Sha256::new()
        .chain_update(password)
        .chain_update(salt)
        .finalize();

    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&hash);
    out
}

/// Constant-time digest comparison.
///
/// Slices of different lengths never match.
pub fn digests_match(candidate: &[u8], expected: &[u8]) -> bool {
    candidate.ct_eq(expected).into()
}
