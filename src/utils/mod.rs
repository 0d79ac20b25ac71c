/// TOML configuration (`aurum.toml`).
pub mod toml_config;
