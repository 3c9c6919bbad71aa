//! # BDNS Common Library
//!
//! Shared code for the BDNS registry tools:
//! - Error type shared by all crates
//! - Bootstrap configuration loading (TOML, environment, CLI)
//! - SQLite initialization and the administrative-node schema

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
