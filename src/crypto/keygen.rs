//! Random key generation.
//!
//! The stock payload source: a fresh key of `num_bits` random bits,
//! ready to be sealed in a vault.

use zeroize::Zeroizing;

use super::entropy::EntropySource;
use crate::errors::{MeltVaultError, Result};

/// Default key size in bits.
pub const DEFAULT_KEY_BITS: u32 = 256;

/// Upper bound on generated key size (1 MiB of key material).
const MAX_KEY_BITS: u32 = 1024 * 1024 * 8;

/// Generate a random key of `num_bits` bits.
///
/// `num_bits` must be a positive multiple of 8.
pub fn generate_key(entropy: &dyn EntropySource, num_bits: u32) -> Result<Zeroizing<Vec<u8>>> {
    if num_bits == 0 || num_bits % 8 != 0 {
        return Err(MeltVaultError::InvalidInput(format!(
            "key size must be a positive multiple of 8 bits (got {num_bits})"
        )));
    }
    if num_bits > MAX_KEY_BITS {
        return Err(MeltVaultError::InvalidInput(format!(
            "key size cannot exceed {MAX_KEY_BITS} bits (got {num_bits})"
        )));
    }

    let mut key = Zeroizing::new(vec![0u8; (num_bits / 8) as usize]);
    entropy.fill(&mut key)?;
    Ok(key)
}
