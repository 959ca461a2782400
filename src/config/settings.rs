use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::DEFAULT_KEY_BITS;
use crate::errors::{MeltVaultError, Result};
use crate::vault::{RetrievalPolicy, SealOptions};

/// Project-level configuration, loaded from `.meltvault.toml`.
///
/// Every field has a sensible default so MeltVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// What a correct password does to the sealed payload.
    #[serde(default)]
    pub retrieval_policy: RetrievalPolicy,

    /// Size of generated keys in bits (default: 256).
    #[serde(default = "default_key_bits")]
    pub key_bits: u32,

    /// Minimum length of a sealing password chosen at the CLI.
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,

    /// Directory (relative to project root) holding the audit database.
    #[serde(default = "default_audit_dir")]
    pub audit_dir: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_key_bits() -> u32 {
    DEFAULT_KEY_BITS
}

fn default_min_password_len() -> usize {
    8
}

fn default_audit_dir() -> String {
    ".meltvault".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            retrieval_policy: RetrievalPolicy::default(),
            key_bits: default_key_bits(),
            min_password_len: default_min_password_len(),
            audit_dir: default_audit_dir(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".meltvault.toml";

    /// Load settings from `<project_dir>/.meltvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            MeltVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.min_password_len == 0 {
            return Err(MeltVaultError::ConfigError(
                "min_password_len must be at least 1".into(),
            ));
        }

        Ok(settings)
    }

    /// Full path of the audit directory.
    ///
    /// Example: `project_dir/.meltvault`
    pub fn audit_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.audit_dir)
    }

    /// Seal options for the configured policy, with OS entropy.
    pub fn seal_options(&self) -> SealOptions {
        SealOptions::with_policy(self.retrieval_policy)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
