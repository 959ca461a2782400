//! One module per `meltvault` subcommand.

#[cfg(feature = "audit-log")]
pub mod audit_cmd;
pub mod completions;
pub mod demo;
pub mod keygen;
pub mod race;
pub mod session;
