//! What happens to the payload after a correct password.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{MeltVaultError, Result};

/// Retrieval policy for a sealed vault.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetrievalPolicy {
    /// Every correct attempt returns a copy; the vault stays sealed.
    #[default]
    Reusable,

    /// The first correct attempt moves the payload out; later attempts
    /// are refused with `AlreadyRetrieved`.
    ConsumeOnSuccess,
}

impl RetrievalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reusable => "reusable",
            Self::ConsumeOnSuccess => "consume-on-success",
        }
    }
}

impl fmt::Display for RetrievalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalPolicy {
    type Err = MeltVaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "reusable" => Ok(Self::Reusable),
            "consume-on-success" | "consume" | "once" => Ok(Self::ConsumeOnSuccess),
            other => Err(MeltVaultError::ConfigError(format!(
                "unknown retrieval policy '{other}' — supported: reusable, consume-on-success"
            ))),
        }
    }
}
