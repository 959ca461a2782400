//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::cli::encoding::to_hex;
use crate::vault::{Vault, VaultState};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a summary table of a vault's public state.
///
/// Salt and digest are not secret; the payload is never shown here.
pub fn print_vault_table(vault: &Vault) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Vault", "Value"]);

    let state = vault.state();
    let state_cell = match state {
        VaultState::Sealed => style(state.as_str()).green().to_string(),
        VaultState::Retrieved => style(state.as_str()).cyan().to_string(),
        VaultState::Destroyed => style(state.as_str()).red().bold().to_string(),
    };
    let payload_len = vault
        .payload_len()
        .map_or_else(|| "-".to_string(), |len| format!("{len} bytes"));

    table.add_row(vec!["Fingerprint".to_string(), vault.fingerprint()]);
    table.add_row(vec!["State".to_string(), state_cell]);
    table.add_row(vec!["Policy".to_string(), vault.policy().to_string()]);
    table.add_row(vec!["Salt".to_string(), to_hex(vault.salt())]);
    table.add_row(vec![
        "Credential digest".to_string(),
        to_hex(vault.credential_digest()),
    ]);
    table.add_row(vec!["Stored bytes".to_string(), payload_len]);

    println!("{table}");
}

/// Tally of a concurrent unlock race.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaceTally {
    pub successes: usize,
    pub meltdowns: usize,
    pub rejected: usize,
}

/// Print the outcome counts of a race alongside the final vault state.
pub fn print_race_table(tally: &RaceTally, final_state: VaultState) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Outcome", "Count"]);

    table.add_row(vec!["Success".to_string(), tally.successes.to_string()]);
    table.add_row(vec!["Meltdown".to_string(), tally.meltdowns.to_string()]);
    table.add_row(vec!["Rejected".to_string(), tally.rejected.to_string()]);
    table.add_row(vec!["Final state".to_string(), final_state.to_string()]);

    println!("{table}");
}
