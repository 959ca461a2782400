//! `meltvault race` — concurrent unlock attempts against one vault.
//!
//! All threads wait on a barrier and then call `unlock` at once.  However
//! the scheduler interleaves them, at most one wrong attempt can observe
//! the vault sealed, so the meltdown count is never above one.

use std::sync::Barrier;
use std::thread;

use crate::cli::output::{self, RaceTally};
use crate::cli::Context;
use crate::crypto::{generate_key, OsEntropy};
use crate::errors::{MeltVaultError, Result};
use crate::vault::Vault;

const RACE_PASSWORD: &[u8] = b"race-password";
const WRONG_PASSWORD: &[u8] = b"not-the-race-password";

/// Upper bound on threads spawned for one race.
pub const MAX_RACE_THREADS: usize = 1024;

/// Total thread count for a race, rejecting zero and oversized races.
fn thread_count(wrong: usize, correct: usize) -> Result<usize> {
    match wrong.checked_add(correct) {
        Some(0) => Err(MeltVaultError::CommandFailed(
            "race needs at least one thread".into(),
        )),
        Some(total) if total <= MAX_RACE_THREADS => Ok(total),
        _ => Err(MeltVaultError::CommandFailed(format!(
            "race is limited to {MAX_RACE_THREADS} threads"
        ))),
    }
}

/// Execute the `race` command.
pub fn execute(ctx: &Context, wrong: usize, correct: usize) -> Result<()> {
    thread_count(wrong, correct)?;

    let key = generate_key(&OsEntropy, ctx.settings.key_bits)?;
    let vault = Vault::seal_with(key.to_vec(), RACE_PASSWORD, &ctx.seal_options())?;
    ctx.record("seal", &vault, Some("race"));
    output::info(&format!(
        "Racing {wrong} wrong and {correct} correct attempts against vault {}",
        vault.fingerprint()
    ));

    let tally = run_race(&vault, wrong, correct)?;

    if tally.meltdowns > 0 {
        ctx.record("meltdown", &vault, Some("race"));
    }
    output::print_race_table(&tally, vault.state());

    if tally.meltdowns > 1 {
        return Err(MeltVaultError::CommandFailed(format!(
            "{} meltdowns on a single vault",
            tally.meltdowns
        )));
    }
    output::success(&format!(
        "{} meltdown(s), final state: {}",
        tally.meltdowns,
        vault.state()
    ));

    Ok(())
}

/// Fire all attempts at once and count the outcomes.
pub fn run_race(vault: &Vault, wrong: usize, correct: usize) -> Result<RaceTally> {
    let total = thread_count(wrong, correct)?;
    let barrier = Barrier::new(total);

    let outcomes = thread::scope(|scope| {
        let handles: Vec<_> = (0..total)
            .map(|i| {
                let attempt = if i < wrong {
                    WRONG_PASSWORD
                } else {
                    RACE_PASSWORD
                };
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    vault.unlock(attempt)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join())
            .collect::<Vec<_>>()
    });

    let mut tally = RaceTally::default();
    for outcome in outcomes {
        match outcome {
            Ok(Ok(_)) => tally.successes += 1,
            Ok(Err(MeltVaultError::WrongPassword)) => tally.meltdowns += 1,
            Ok(Err(e)) if e.is_auth_failure() => tally.rejected += 1,
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(MeltVaultError::CommandFailed(
                    "unlock thread panicked".into(),
                ))
            }
        }
    }

    Ok(tally)
}
