//! # Command System
//!
//! Text command parsing and dispatch for the command channel.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Bang command parser with event commands

pub mod bang;

// Re-export the CommandHandler from the handler module
pub use crate::command_handler::{CommandHandler, CommandOutcome, Requester};

pub use bang::{parse_bang_command, parse_command, BangCommand, Command};
