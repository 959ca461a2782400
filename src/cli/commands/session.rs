//! `meltvault session` — seal a payload and try to unlock it.
//!
//! The payload comes from piped stdin, or is a freshly generated key when
//! stdin is a terminal.  Attempts come from repeated `--attempt` flags or
//! a single interactive prompt.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::encoding::parse_encoding;
use crate::cli::{output, prompt_attempt, prompt_new_password, report_attempt, Context};
use crate::crypto::{generate_key, OsEntropy};
use crate::errors::{MeltVaultError, Result};
use crate::vault::{Payload, Vault};

/// Execute the `session` command.
pub fn execute(ctx: &Context, attempts: &[String], format: &str) -> Result<()> {
    let encoding = parse_encoding(format)?;

    let payload = if io::stdin().is_terminal() {
        Payload::from(generate_key(&OsEntropy, ctx.settings.key_bits)?)
    } else {
        read_piped_payload()?
    };

    if !attempts.is_empty() {
        output::warning("Attempts provided on command line — they may appear in shell history.");
    }

    let payload_len = payload.len();
    let vault = {
        let password = prompt_new_password(ctx.settings.min_password_len)?;
        Vault::seal_with(payload, password.as_bytes(), &ctx.seal_options())?
    };
    ctx.record("seal", &vault, Some(&format!("{payload_len} bytes")));
    output::success(&format!(
        "Vault {} sealed ({payload_len} bytes, {} policy)",
        vault.fingerprint(),
        vault.policy()
    ));

    if attempts.is_empty() {
        let attempt = prompt_attempt()?;
        let outcome = vault.unlock(attempt.as_bytes());
        report_attempt(ctx, &vault, 1, &outcome, encoding);
        return settle(outcome.map(|_| ()));
    }

    let mut last = Ok(());
    for (i, attempt) in attempts.iter().enumerate() {
        let outcome = vault.unlock(attempt.as_bytes());
        report_attempt(ctx, &vault, i + 1, &outcome, encoding);

        last = outcome.map(|_| ());
        if matches!(last, Err(MeltVaultError::EntropyUnavailable(_))) {
            break;
        }
    }

    settle(last)
}

/// The final attempt's error was already reported, so the exit status
/// only needs a short summary.
fn settle(last: Result<()>) -> Result<()> {
    last.map_err(|_| {
        MeltVaultError::CommandFailed("session ended without retrieving the payload".into())
    })
}

/// Read the whole of stdin as the payload, dropping one trailing newline.
fn read_piped_payload() -> Result<Payload> {
    let mut buf = Zeroizing::new(Vec::new());
    io::stdin().read_to_end(&mut buf)?;

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    Ok(Payload::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_last_attempt_becomes_short_summary() {
        let err = settle(Err(MeltVaultError::WrongPassword)).unwrap_err();
        assert!(matches!(err, MeltVaultError::CommandFailed(_)));
        assert!(!err.to_string().contains("contents have been destroyed"));
    }

    #[test]
    fn successful_last_attempt_passes_through() {
        assert!(settle(Ok(())).is_ok());
    }
}
