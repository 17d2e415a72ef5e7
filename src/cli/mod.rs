//! CLI module for the cwmp-model binary

pub mod commands;
pub mod error;
pub mod output;

pub use error::CliError;
