use thiserror::Error;

/// All errors that can occur in MeltVault.
#[derive(Debug, Error)]
pub enum MeltVaultError {
    // --- Sealing errors ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Authentication errors ---
    #[error("Wrong password — vault contents have been destroyed")]
    WrongPassword,

    #[error("Vault already destroyed — contents are unrecoverable")]
    AlreadyDestroyed,

    #[error("Vault payload was already retrieved")]
    AlreadyRetrieved,

    // --- Crypto errors ---
    #[error("Secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Audit error: {0}")]
    AuditError(String),
}

impl MeltVaultError {
    /// True for the outcomes of an `unlock` call that was refused.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::WrongPassword | Self::AlreadyDestroyed | Self::AlreadyRetrieved
        )
    }
}

/// Convenience type alias for MeltVault results.
pub type Result<T> = std::result::Result<T, MeltVaultError>;
