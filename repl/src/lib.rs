//! circ front desk - an interactive terminal for the circ lending engine.
//!
//! Members log in to browse, borrow and return books; administrators manage
//! the catalog and member accounts. Modules:
//!
//! - `config`: JSON configuration for the store and the policies
//! - `command`: Line parsing into commands
//! - `repl`: Session state and command execution
//! - `format`: Table rendering and help

pub mod config;
mod command;
mod format;
mod repl;

pub use command::{tokenize, Command};
pub use config::{Backend, CircConfig, ConfigError, ConfigResult, StoreConfig};
pub use format::{help_text, print_help};
pub use repl::Repl;
