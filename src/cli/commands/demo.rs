//! `meltvault demo` — scripted walkthrough of the one-strike protocol.
//!
//! Seals a fresh key, then tries the correct password, a wrong one, and
//! the correct one again after the meltdown.

use crate::cli::encoding::{render, Encoding};
use crate::cli::{output, report_attempt, Context};
use crate::crypto::{generate_key, OsEntropy};
use crate::errors::Result;
use crate::vault::Vault;

const DEMO_PASSWORD: &str = "CorrectPassword123";
const WRONG_PASSWORD: &str = "WrongPassword";

/// Execute the `demo` command.
pub fn execute(ctx: &Context) -> Result<()> {
    let key = generate_key(&OsEntropy, ctx.settings.key_bits)?;
    output::info(&format!("Generated key: {}", render(&key, Encoding::Hex)));

    let vault = Vault::seal_with(key.to_vec(), DEMO_PASSWORD.as_bytes(), &ctx.seal_options())?;
    ctx.record("seal", &vault, Some(&format!("{} bytes", key.len())));
    output::success(&format!("Vault {} sealed", vault.fingerprint()));
    output::print_vault_table(&vault);

    let script = [
        ("correct password", DEMO_PASSWORD),
        ("wrong password", WRONG_PASSWORD),
        ("correct password after meltdown", DEMO_PASSWORD),
    ];

    for (i, (label, attempt)) in script.iter().enumerate() {
        output::info(&format!("Attempt {} ({label})", i + 1));
        let outcome = vault.unlock(attempt.as_bytes());

        if let Ok(payload) = &outcome {
            let intact = payload.as_bytes() == key.as_slice();
            output::tip(if intact {
                "retrieved bytes match the original key"
            } else {
                "retrieved bytes differ from the original key"
            });
        }

        report_attempt(ctx, &vault, i + 1, &outcome, Encoding::Hex);
    }

    output::print_vault_table(&vault);
    Ok(())
}
