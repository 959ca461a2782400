//! Secure random source.
//!
//! Every random byte the vault consumes (salts, wipe noise, generated
//! keys) is drawn through the `EntropySource` trait.  The default
//! implementation reads from the operating system CSPRNG; a failure is
//! reported as `EntropyUnavailable` and never papered over with a
//! weaker generator.

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::errors::{MeltVaultError, Result};

/// Length of the per-vault salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// A cryptographically secure, stateless source of random bytes.
///
/// Implementations must be safe to share between threads: a single
/// source is used by every `unlock` call on a vault.
pub trait EntropySource: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<()>;
}

/// The operating system CSPRNG (`getrandom` under the hood).
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| MeltVaultError::EntropyUnavailable(e.to_string()))
    }
}

/// Draw a fresh 16-byte salt.
pub fn generate_salt(entropy: &dyn EntropySource) -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    entropy.fill(&mut salt)?;
    Ok(salt)
}
