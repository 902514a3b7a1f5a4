//! Library half of the `tablelens` binary.
//!
//! Argument definitions, command implementations, and output rendering are
//! exposed here so they can be exercised by tests; `main.rs` only parses
//! arguments, initializes logging, and maps the outcome to an exit status.

pub mod cli;
pub mod commands;
pub mod output;

pub use cli::{Cli, Command};
