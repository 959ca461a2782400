//! `meltvault audit` — display the vault event log.
//!
//! Usage:
//!   meltvault audit               # show last 50 events
//!   meltvault audit --since 24h   # events from the last day

use chrono::Utc;

use crate::audit::{AuditEntry, AuditLog};
use crate::cli::output;
use crate::cli::Context;
use crate::errors::{MeltVaultError, Result};

/// Execute the `audit` command.
pub fn execute(ctx: &Context, last: usize, since: Option<&str>) -> Result<()> {
    if !AuditLog::db_path(&ctx.audit_dir).exists() {
        output::info("No audit entries found.");
        output::tip("Run `meltvault demo` to record some vault events.");
        return Ok(());
    }

    let audit = AuditLog::open(&ctx.audit_dir)
        .ok_or_else(|| MeltVaultError::AuditError("failed to open audit database".into()))?;

    let since_dt = match since {
        Some(s) => Some(parse_duration(s)?),
        None => None,
    };

    let entries = audit.query(last, since_dt)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);

    Ok(())
}

/// Parse a look-back window like "2w", "7d", "24h", "30m" into the
/// timestamp it reaches back to.
fn parse_duration(input: &str) -> Result<chrono::DateTime<Utc>> {
    let input = input.trim();
    let invalid = || {
        MeltVaultError::CommandFailed(format!(
            "invalid duration '{input}' — use format like 2w, 7d, 24h, or 30m"
        ))
    };

    let unit = input.chars().last().ok_or_else(invalid)?;
    let num: i64 = input[..input.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| invalid())?;
    if num < 0 {
        return Err(invalid());
    }

    let window = match unit {
        'w' => chrono::Duration::try_weeks(num),
        'd' => chrono::Duration::try_days(num),
        'h' => chrono::Duration::try_hours(num),
        'm' => chrono::Duration::try_minutes(num),
        _ => None,
    }
    .ok_or_else(invalid)?;

    Utc::now().checked_sub_signed(window).ok_or_else(invalid)
}

/// Print audit entries in a formatted table.
pub fn print_audit_table(entries: &[AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Event", "Vault", "Details"]);

    for entry in entries {
        let time = entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let details = entry.details.as_deref().unwrap_or("-");

        table.add_row(vec![
            time,
            colorize_operation(&entry.operation),
            entry.vault_id.clone(),
            details.to_string(),
        ]);
    }

    println!("{}", style(format!("{} vault events:", entries.len())).bold());
    println!("{table}");
}

/// Colorize operation names for display.
fn colorize_operation(op: &str) -> String {
    use console::style;

    match op {
        "seal" => style(op).blue().to_string(),
        "unlock" => style(op).green().to_string(),
        "meltdown" => style(op).red().bold().to_string(),
        "rejected" => style(op).yellow().to_string(),
        _ => op.to_string(),
    }
}
