//! Configuration module
//!
//! Settings loaded from `config.toml`: server address, search defaults,
//! import/export limits and logging.

pub mod config;

pub use config::Config;
