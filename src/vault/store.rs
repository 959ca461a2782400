//! The sealed vault and its one-strike unlock protocol.
//!
//! A `Vault` keeps a payload behind a salted SHA-256 credential digest.
//! The first wrong password overwrites the payload in place with fresh
//! random bytes and moves the vault to its terminal `Destroyed` state;
//! nothing can bring the original bytes back after that, not even the
//! right password.
//!
//! The state check, the digest comparison, the wipe and the state
//! transition all happen under one mutex, so two threads racing on the
//! same vault can never both see it sealed, and a correct attempt can
//! never hand out the payload once a wipe has begun.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use zeroize::Zeroizing;

use crate::crypto::{
    credential_digest, digests_match, generate_salt, EntropySource, OsEntropy, DIGEST_LEN,
    SALT_LEN,
};
use crate::errors::{MeltVaultError, Result};

use super::payload::Payload;
use super::policy::RetrievalPolicy;

/// Number of salt bytes rendered by `Vault::fingerprint`.
const FINGERPRINT_LEN: usize = 4;

/// Externally visible lifecycle state of a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// Holding the original payload.
    Sealed,
    /// Payload moved out by a correct attempt (consume-on-success only).
    Retrieved,
    /// Payload wiped after a wrong attempt.  Terminal.
    Destroyed,
}

impl VaultState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sealed => "sealed",
            Self::Retrieved => "retrieved",
            Self::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for VaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knobs for `Vault::seal_with`.
#[derive(Clone)]
pub struct SealOptions {
    /// What a correct attempt does to the stored payload.
    pub policy: RetrievalPolicy,
    /// Where salts and wipe noise come from.
    pub entropy: Arc<dyn EntropySource>,
}

impl Default for SealOptions {
    fn default() -> Self {
        Self {
            policy: RetrievalPolicy::default(),
            entropy: Arc::new(OsEntropy),
        }
    }
}

impl SealOptions {
    /// Default entropy, explicit policy.
    pub fn with_policy(policy: RetrievalPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }
}

/// Mutable interior of a vault, guarded by the vault's mutex.
enum Chamber {
    Sealed(Payload),
    Retrieved,
    /// `residue` is the scrambled buffer, same length as the original.
    /// It is `None` only if the entropy source failed mid-wipe, in which
    /// case the buffer was zeroized and dropped instead.
    Destroyed { residue: Option<Payload> },
}

impl Chamber {
    fn state(&self) -> VaultState {
        match self {
            Self::Sealed(_) => VaultState::Sealed,
            Self::Retrieved => VaultState::Retrieved,
            Self::Destroyed { .. } => VaultState::Destroyed,
        }
    }

    /// The error a non-sealed chamber answers every attempt with.
    fn refusal(&self) -> Option<MeltVaultError> {
        match self {
            Self::Sealed(_) => None,
            Self::Retrieved => Some(MeltVaultError::AlreadyRetrieved),
            Self::Destroyed { .. } => Some(MeltVaultError::AlreadyDestroyed),
        }
    }
}

/// A single-use, password-gated secret container.
///
/// Create one with `Vault::seal`, then call `unlock`.  `Vault` is
/// `Send + Sync`; wrap it in an `Arc` to share it between threads.
pub struct Vault {
    /// Per-vault random salt, fixed at seal time.
    salt: [u8; SALT_LEN],

    /// `SHA-256(password || salt)`, fixed at seal time.
    credential_digest: [u8; DIGEST_LEN],

    policy: RetrievalPolicy,

    entropy: Arc<dyn EntropySource>,

    chamber: Mutex<Chamber>,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Seal `payload` behind `password` using the OS random source and
    /// the reusable retrieval policy.
    pub fn seal(payload: impl Into<Payload>, password: &[u8]) -> Result<Self> {
        Self::seal_with(payload, password, &SealOptions::default())
    }

    /// Seal `payload` behind `password` with explicit options.
    ///
    /// Fails with `InvalidInput` if either argument is empty and with
    /// `EntropyUnavailable` if no salt can be drawn.  The password is
    /// only used to compute the digest; it is not stored.
    pub fn seal_with(
        payload: impl Into<Payload>,
        password: &[u8],
        options: &SealOptions,
    ) -> Result<Self> {
        let payload = payload.into();

        if payload.is_empty() {
            return Err(MeltVaultError::InvalidInput(
                "payload must not be empty".into(),
            ));
        }
        if password.is_empty() {
            return Err(MeltVaultError::InvalidInput(
                "password must not be empty".into(),
            ));
        }

        // 1. Fresh salt for this vault only.
        let salt = generate_salt(options.entropy.as_ref())?;

        // 2. Salted one-way digest of the password.
        let credential_digest = credential_digest(password, &salt);

        Ok(Self {
            salt,
            credential_digest,
            policy: options.policy,
            entropy: Arc::clone(&options.entropy),
            chamber: Mutex::new(Chamber::Sealed(payload)),
        })
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Try to open the vault with `attempt`.
    ///
    /// - Already destroyed: `AlreadyDestroyed`, without hashing anything.
    /// - Already retrieved: `AlreadyRetrieved`, without hashing anything.
    /// - Correct password: the payload (a copy, or the original itself
    ///   under `ConsumeOnSuccess`).
    /// - Wrong password: the payload is wiped, the vault becomes
    ///   `Destroyed`, and `WrongPassword` is returned.
    pub fn unlock(&self, attempt: &[u8]) -> Result<Payload> {
        let mut chamber = self.lock();

        if let Some(refusal) = chamber.refusal() {
            return Err(refusal);
        }

        let candidate = Zeroizing::new(credential_digest(attempt, &self.salt));
        if !digests_match(candidate.as_slice(), &self.credential_digest) {
            self.melt(&mut chamber)?;
            return Err(MeltVaultError::WrongPassword);
        }

        match self.policy {
            RetrievalPolicy::Reusable => match &*chamber {
                Chamber::Sealed(payload) => Ok(payload.clone()),
                other => Err(other
                    .refusal()
                    .unwrap_or(MeltVaultError::AlreadyDestroyed)),
            },
            RetrievalPolicy::ConsumeOnSuccess => {
                match std::mem::replace(&mut *chamber, Chamber::Retrieved) {
                    Chamber::Sealed(payload) => Ok(payload),
                    other => {
                        let refusal = other.refusal();
                        *chamber = other;
                        Err(refusal.unwrap_or(MeltVaultError::AlreadyDestroyed))
                    }
                }
            }
        }
    }

    /// Overwrite the payload with fresh randomness, then mark the vault
    /// destroyed.
    ///
    /// Must be called with the chamber lock held.  The overwrite happens
    /// before the transition, and the residue is never all zero nor a
    /// copy of the payload.  The transition happens even if the entropy
    /// source fails; in that case the buffer is zeroized and dropped and
    /// the entropy error is returned.
    fn melt(&self, chamber: &mut Chamber) -> Result<()> {
        let Chamber::Sealed(payload) = chamber else {
            return Ok(());
        };

        match payload.scramble(self.entropy.as_ref()) {
            Ok(()) => {
                let residue = std::mem::take(payload);
                *chamber = Chamber::Destroyed {
                    residue: Some(residue),
                };
                Ok(())
            }
            Err(e) => {
                // Dropping the old chamber zeroizes the partially
                // scrambled buffer.
                *chamber = Chamber::Destroyed { residue: None };
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Current lifecycle state.
    pub fn state(&self) -> VaultState {
        self.lock().state()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state() == VaultState::Destroyed
    }

    pub fn policy(&self) -> RetrievalPolicy {
        self.policy
    }

    /// The per-vault salt.
    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// The stored salted password digest.
    pub fn credential_digest(&self) -> &[u8; DIGEST_LEN] {
        &self.credential_digest
    }

    /// Length of the bytes currently held: the payload while sealed,
    /// the random residue once destroyed.  `None` after retrieval or a
    /// failed wipe.
    pub fn payload_len(&self) -> Option<usize> {
        match &*self.lock() {
            Chamber::Sealed(payload) => Some(payload.len()),
            Chamber::Destroyed {
                residue: Some(residue),
            } => Some(residue.len()),
            _ => None,
        }
    }

    /// Short hex tag derived from the salt, for naming a vault in logs.
    pub fn fingerprint(&self) -> String {
        self.salt[..FINGERPRINT_LEN]
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    /// Every critical section ends with the chamber in a whole state, so
    /// a guard poisoned by a panicking caller is still safe to reuse.
    fn lock(&self) -> MutexGuard<'_, Chamber> {
        self.chamber.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("fingerprint", &self.fingerprint())
            .field("state", &self.state())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// OS entropy for the first `budget` fills, then failure.
    struct Exhausting {
        budget: AtomicUsize,
    }

    impl Exhausting {
        fn after(budget: usize) -> Arc<Self> {
            Arc::new(Self {
                budget: AtomicUsize::new(budget),
            })
        }
    }

    impl EntropySource for Exhausting {
        fn fill(&self, dest: &mut [u8]) -> Result<()> {
            let left = self.budget.load(Ordering::SeqCst);
            if left == 0 {
                return Err(MeltVaultError::EntropyUnavailable("exhausted".into()));
            }
            self.budget.store(left - 1, Ordering::SeqCst);
            OsEntropy.fill(dest)
        }
    }

    /// Fills each draw with the next queued byte value, then falls back
    /// to OS entropy once the queue runs dry.
    struct Scripted {
        draws: Mutex<VecDeque<u8>>,
    }

    impl Scripted {
        fn with(draws: &[u8]) -> Arc<Self> {
            Arc::new(Self {
                draws: Mutex::new(draws.iter().copied().collect()),
            })
        }

        fn remaining(&self) -> usize {
            self.draws.lock().unwrap().len()
        }
    }

    impl EntropySource for Scripted {
        fn fill(&self, dest: &mut [u8]) -> Result<()> {
            match self.draws.lock().unwrap().pop_front() {
                Some(byte) => {
                    dest.fill(byte);
                    Ok(())
                }
                None => OsEntropy.fill(dest),
            }
        }
    }

    fn residue(vault: &Vault) -> Option<Vec<u8>> {
        match &*vault.lock() {
            Chamber::Destroyed {
                residue: Some(residue),
            } => Some(residue.as_bytes().to_vec()),
            _ => None,
        }
    }

    #[test]
    fn wipe_replaces_payload_with_same_length_noise() {
        let original = vec![0x5Au8; 64];
        let vault = Vault::seal(original.clone(), b"right").unwrap();

        assert!(matches!(
            vault.unlock(b"wrong"),
            Err(MeltVaultError::WrongPassword)
        ));

        let noise = residue(&vault).expect("destroyed vault keeps its residue");
        assert_eq!(noise.len(), original.len());
        assert_ne!(noise, original);
        assert!(noise.iter().any(|&b| b != 0), "residue must not be zeroes");
        assert_eq!(vault.payload_len(), Some(original.len()));
    }

    #[test]
    fn single_byte_payloads_never_leave_zero_or_original_residue() {
        for value in 0..=255u8 {
            for _ in 0..4 {
                let vault = Vault::seal(vec![value], b"right").unwrap();
                assert!(matches!(
                    vault.unlock(b"wrong"),
                    Err(MeltVaultError::WrongPassword)
                ));

                let noise = residue(&vault).expect("destroyed vault keeps its residue");
                assert_eq!(noise.len(), 1);
                assert_ne!(noise, vec![0u8], "residue of [{value:#04x}] is zero");
                assert_ne!(noise, vec![value], "residue of [{value:#04x}] is unchanged");
            }
        }
    }

    #[test]
    fn wipe_redraws_zero_and_original_bytes() {
        // Salt, then a zero draw, then a draw equal to the payload.
        let entropy = Scripted::with(&[0x11, 0x00, 0x42]);
        let options = SealOptions {
            entropy: entropy.clone(),
            ..SealOptions::default()
        };
        let vault = Vault::seal_with(vec![0x42u8; 4], b"right", &options).unwrap();

        assert!(matches!(
            vault.unlock(b"wrong"),
            Err(MeltVaultError::WrongPassword)
        ));
        assert_eq!(entropy.remaining(), 0);

        let noise = residue(&vault).unwrap();
        assert_eq!(noise.len(), 4);
        assert_ne!(noise, vec![0u8; 4]);
        assert_ne!(noise, vec![0x42u8; 4]);
    }

    #[test]
    fn wipe_gives_up_on_a_source_stuck_at_zero() {
        let entropy = Scripted::with(&[0x00; 200]);
        let options = SealOptions {
            entropy,
            ..SealOptions::default()
        };
        let vault = Vault::seal_with(vec![9u8; 2], b"right", &options).unwrap();

        assert!(matches!(
            vault.unlock(b"wrong"),
            Err(MeltVaultError::EntropyUnavailable(_))
        ));
        assert!(vault.is_destroyed());
        assert!(residue(&vault).is_none());
        assert!(matches!(
            vault.unlock(b"right"),
            Err(MeltVaultError::AlreadyDestroyed)
        ));
    }

    #[test]
    fn later_attempts_leave_residue_untouched() {
        let vault = Vault::seal(vec![1u8; 32], b"right").unwrap();
        let _ = vault.unlock(b"wrong");
        let first = residue(&vault).unwrap();

        let _ = vault.unlock(b"wrong again");
        let _ = vault.unlock(b"right");
        assert_eq!(residue(&vault).unwrap(), first);
    }

    #[test]
    fn seal_fails_without_entropy() {
        let options = SealOptions {
            entropy: Exhausting::after(0),
            ..SealOptions::default()
        };
        let result = Vault::seal_with(vec![1u8; 8], b"pw", &options);
        assert!(matches!(
            result,
            Err(MeltVaultError::EntropyUnavailable(_))
        ));
    }

    #[test]
    fn entropy_failure_during_wipe_still_destroys() {
        // One fill for the salt, none left for the wipe.
        let options = SealOptions {
            entropy: Exhausting::after(1),
            ..SealOptions::default()
        };
        let vault = Vault::seal_with(vec![7u8; 16], b"right", &options).unwrap();

        assert!(matches!(
            vault.unlock(b"wrong"),
            Err(MeltVaultError::EntropyUnavailable(_))
        ));
        assert!(vault.is_destroyed());
        assert!(residue(&vault).is_none());
        assert_eq!(vault.payload_len(), None);
        assert!(matches!(
            vault.unlock(b"right"),
            Err(MeltVaultError::AlreadyDestroyed)
        ));
    }

    #[test]
    fn consume_policy_moves_payload_out() {
        let vault = Vault::seal_with(
            b"one-time".to_vec(),
            b"pw",
            &SealOptions::with_policy(RetrievalPolicy::ConsumeOnSuccess),
        )
        .unwrap();

        let payload = vault.unlock(b"pw").unwrap();
        assert_eq!(payload.as_bytes(), b"one-time");
        assert_eq!(vault.state(), VaultState::Retrieved);
        assert_eq!(vault.payload_len(), None);

        assert!(matches!(
            vault.unlock(b"pw"),
            Err(MeltVaultError::AlreadyRetrieved)
        ));
        // Nothing left to wipe; a wrong attempt is refused the same way.
        assert!(matches!(
            vault.unlock(b"nope"),
            Err(MeltVaultError::AlreadyRetrieved)
        ));
        assert_eq!(vault.state(), VaultState::Retrieved);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let vault = Arc::new(Vault::seal(vec![3u8; 8], b"pw").unwrap());

        let poisoner = Arc::clone(&vault);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock();
            panic!("poison the chamber");
        })
        .join();

        assert_eq!(vault.state(), VaultState::Sealed);
        assert_eq!(vault.unlock(b"pw").unwrap().as_bytes(), &[3u8; 8]);
    }

    #[test]
    fn fingerprint_is_hex_of_salt_prefix() {
        let vault = Vault::seal(vec![1u8], b"pw").unwrap();
        let fp = vault.fingerprint();
        assert_eq!(fp.len(), FINGERPRINT_LEN * 2);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp[..2], format!("{:02x}", vault.salt()[0]));
    }

    #[test]
    fn debug_does_not_leak_payload() {
        let vault = Vault::seal(b"very-secret-bytes".to_vec(), b"pw").unwrap();
        let rendered = format!("{vault:?}");
        assert!(rendered.contains("sealed") || rendered.contains("Sealed"));
        assert!(!rendered.contains("very-secret-bytes"));
    }
}
