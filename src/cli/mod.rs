//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod encoding;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{MeltVaultError, Result};
use crate::vault::{Payload, SealOptions, Vault};

use encoding::{render, Encoding};

/// Environment variable consulted for the sealing password.
pub const PASSWORD_ENV: &str = "MELTVAULT_PASSWORD";

/// MeltVault CLI: one-strike password vault.
#[derive(Parser)]
#[command(
    name = "meltvault",
    about = "One-strike password vault: a single wrong password destroys the secret",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Retrieval policy: reusable or consume-on-success (overrides .meltvault.toml)
    #[arg(long, global = true)]
    pub policy: Option<String>,

    /// Audit directory (overrides .meltvault.toml, default: .meltvault)
    #[arg(long, global = true)]
    pub audit_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Walk through seal, correct unlock, wrong unlock, and post-meltdown unlock
    Demo,

    /// Generate and print a random key
    Keygen {
        /// Key size in bits (default from .meltvault.toml, else 256)
        #[arg(long)]
        bits: Option<u32>,

        /// Output format: hex (default) or base64
        #[arg(short, long, default_value = "hex")]
        format: String,
    },

    /// Seal a payload (piped stdin or a fresh key) and try to unlock it
    Session {
        /// Password attempt, in order (omit for one interactive prompt)
        #[arg(long = "attempt")]
        attempts: Vec<String>,

        /// Payload output format: hex (default), base64, or text
        #[arg(short, long, default_value = "hex")]
        format: String,
    },

    /// Hammer one vault with concurrent unlock attempts
    Race {
        /// Number of threads sending a wrong password
        #[arg(long, default_value = "8")]
        threads: usize,

        /// Number of threads sending the correct password
        #[arg(long, default_value = "0")]
        correct: usize,
    },

    /// View the audit log of vault events
    #[cfg(feature = "audit-log")]
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

// ---------------------------------------------------------------------------
// Shared context used by multiple commands
// ---------------------------------------------------------------------------

/// Settings resolved from `.meltvault.toml` plus command-line overrides.
pub struct Context {
    pub settings: Settings,
    pub audit_dir: PathBuf,
}

impl Context {
    /// Load settings from the working directory and apply CLI overrides.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let mut settings = Settings::load(&cwd)?;

        if let Some(policy) = &cli.policy {
            settings.retrieval_policy = policy.parse()?;
        }
        if let Some(dir) = &cli.audit_dir {
            settings.audit_dir = dir.clone();
        }

        let audit_dir = settings.audit_path(&cwd);
        Ok(Self {
            settings,
            audit_dir,
        })
    }

    pub fn seal_options(&self) -> SealOptions {
        self.settings.seal_options()
    }

    /// Record a vault event in the audit log (no-op without `audit-log`).
    pub fn record(&self, op: &str, vault: &Vault, details: Option<&str>) {
        #[cfg(feature = "audit-log")]
        crate::audit::log_event(&self.audit_dir, op, &vault.fingerprint(), details);

        #[cfg(not(feature = "audit-log"))]
        let _ = (op, vault, details);
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get a new sealing password, trying in order:
/// 1. `MELTVAULT_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt with confirmation
///
/// Enforces `min_len`. Returns `Zeroizing<String>` so the password is
/// wiped from memory on drop.
pub fn prompt_new_password(min_len: usize) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            let pw = Zeroizing::new(pw);
            if pw.chars().count() < min_len {
                return Err(MeltVaultError::CommandFailed(format!(
                    "password must be at least {min_len} characters"
                )));
            }
            return Ok(pw);
        }
    }

    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose vault password")
                .with_confirmation(
                    "Confirm vault password",
                    "Passwords do not match, try again",
                )
                .interact()
                .map_err(|e| MeltVaultError::CommandFailed(format!("password prompt: {e}")))?,
        );

        if password.chars().count() < min_len {
            output::warning(&format!(
                "Password must be at least {min_len} characters. Try again."
            ));
            continue;
        }

        return Ok(password);
    }
}

/// Prompt once for an unlock attempt.
pub fn prompt_attempt() -> Result<Zeroizing<String>> {
    let pw = dialoguer::Password::new()
        .with_prompt("Enter password to unlock (one wrong answer destroys the vault)")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| MeltVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Print and audit the outcome of one unlock attempt.
///
/// `number` is the 1-based attempt index shown to the user.
pub fn report_attempt(
    ctx: &Context,
    vault: &Vault,
    number: usize,
    outcome: &Result<Payload>,
    encoding: Encoding,
) {
    match outcome {
        Ok(payload) => {
            output::success(&format!("Attempt {number}: SUCCESS — data retrieved"));
            println!("{}", render(payload.as_bytes(), encoding));
            ctx.record("unlock", vault, None);
        }
        Err(MeltVaultError::WrongPassword) => {
            output::error(&format!(
                "Attempt {number}: MELTDOWN TRIGGERED — wrong password, contents destroyed"
            ));
            ctx.record("meltdown", vault, Some("wrong password"));
        }
        Err(MeltVaultError::AlreadyDestroyed) => {
            output::warning(&format!(
                "Attempt {number}: MELTDOWN OCCURRED — data already destroyed"
            ));
            ctx.record("rejected", vault, Some("already destroyed"));
        }
        Err(MeltVaultError::AlreadyRetrieved) => {
            output::warning(&format!(
                "Attempt {number}: REFUSED — payload was already retrieved"
            ));
            ctx.record("rejected", vault, Some("already retrieved"));
        }
        Err(e) => {
            output::error(&format!("Attempt {number}: {e}"));
            ctx.record("meltdown", vault, Some("wipe without entropy"));
        }
    }
}
