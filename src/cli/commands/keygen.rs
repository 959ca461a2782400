//! `meltvault keygen` — print a fresh random key.

use crate::cli::encoding::{parse_encoding, render, Encoding};
use crate::cli::Context;
use crate::crypto::{generate_key, OsEntropy};
use crate::errors::{MeltVaultError, Result};

/// Execute the `keygen` command.
pub fn execute(ctx: &Context, bits: Option<u32>, format: &str) -> Result<()> {
    let encoding = parse_encoding(format)?;
    if encoding == Encoding::Text {
        return Err(MeltVaultError::CommandFailed(
            "keys are binary — use hex or base64".into(),
        ));
    }

    let bits = bits.unwrap_or(ctx.settings.key_bits);
    let key = generate_key(&OsEntropy, bits)?;
    println!("{}", render(&key, encoding));

    Ok(())
}
