//! CLI module
//!
//! Command-line interface for running listing operations.
//!
//! # Commands
//!
//! - `list` - Run a listing, following continuation tokens
//! - `operations` - List built-in and custom services and their operations
//! - `describe` - Show one operation definition
//! - `validate` - Check a custom service definition file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{paging_options, Runner};
