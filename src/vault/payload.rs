//! The secret bytes held by a vault.
//!
//! `Payload` owns its buffer and zeroes it when dropped, so a copy
//! handed out by `unlock` does not linger in memory either.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::EntropySource;
use crate::errors::{MeltVaultError, Result};

/// Draws allowed before a source that keeps yielding zeros or the
/// original bytes is declared broken.
const MAX_SCRAMBLE_DRAWS: usize = 64;

/// An opaque, fixed-length secret byte sequence.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct Payload {
    bytes: Vec<u8>,
}

impl Payload {
    /// Wrap raw bytes as a payload.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Access the raw payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Take the bytes out, still wrapped so they are wiped on drop.
    pub fn into_bytes(mut self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(std::mem::take(&mut self.bytes))
    }

    /// Overwrite every byte in place with fresh randomness.
    ///
    /// The length is unchanged.  The buffer is rewritten where it lives,
    /// so the original bytes are gone from this allocation once this
    /// returns `Ok`.  A draw that comes out all zero or equal to the
    /// original is thrown away and drawn again.
    pub(crate) fn scramble(&mut self, entropy: &dyn EntropySource) -> Result<()> {
        let original = Zeroizing::new(self.bytes.clone());

        for _ in 0..MAX_SCRAMBLE_DRAWS {
            entropy.fill(&mut self.bytes)?;

            let all_zero = self.bytes.iter().all(|&b| b == 0);
            if !all_zero && self.bytes != *original {
                return Ok(());
            }
        }

        Err(MeltVaultError::EntropyUnavailable(format!(
            "no usable wipe bytes after {MAX_SCRAMBLE_DRAWS} draws"
        )))
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl From<Zeroizing<Vec<u8>>> for Payload {
    fn from(mut bytes: Zeroizing<Vec<u8>>) -> Self {
        Self::new(std::mem::take(&mut *bytes))
    }
}

// Never print secret bytes, only their length.
impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::OsEntropy;

    #[test]
    fn debug_redacts_contents() {
        let payload = Payload::from(&b"top-secret"[..]);
        let rendered = format!("{payload:?}");
        assert!(rendered.contains("len: 10"));
        assert!(!rendered.contains("top-secret"));
    }

    #[test]
    fn scramble_keeps_length_and_changes_bytes() {
        let original = vec![0xAAu8; 48];
        let mut payload = Payload::new(original.clone());
        payload.scramble(&OsEntropy).unwrap();
        assert_eq!(payload.len(), original.len());
        assert_ne!(payload.as_bytes(), original.as_slice());
    }

    #[test]
    fn scramble_never_leaves_zero_or_original_single_byte() {
        for value in 0..=255u8 {
            for _ in 0..8 {
                let mut payload = Payload::new(vec![value]);
                payload.scramble(&OsEntropy).unwrap();
                assert_ne!(payload.as_bytes(), &[0]);
                assert_ne!(payload.as_bytes(), &[value]);
            }
        }
    }

    #[test]
    fn into_bytes_returns_contents() {
        let payload = Payload::from(vec![1, 2, 3]);
        assert_eq!(*payload.into_bytes(), vec![1, 2, 3]);
    }

    #[test]
    fn from_zeroizing_moves_bytes() {
        let payload = Payload::from(Zeroizing::new(vec![9u8; 4]));
        assert_eq!(payload.as_bytes(), &[9, 9, 9, 9]);
    }
}
