//! Configuration loaded from `.meltvault.toml`.

pub mod settings;

pub use settings::Settings;
