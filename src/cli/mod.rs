//! CLI commands for the wallet

pub mod commands;

pub use commands::*;
