//! # Bang Commands (!)
//!
//! Text commands prefixed with an exclamation point, plus the bare `vox`
//! call-out.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Event commands (add, setreminder, delete, events) and quick commands

pub mod events;
pub mod quick;

use crate::error::CommandError;

pub const PREFIX: char = '!';

/// Represents a parsed bang command
#[derive(Debug, Clone)]
pub struct BangCommand {
    /// The command name (without the ! prefix)
    pub name: String,
    /// Arguments passed to the command
    pub args: Vec<String>,
}

impl BangCommand {
    /// Check if the command matches a given name (case-sensitive, like the
    /// rest of the event commands)
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

/// Parse a bang command from input text
///
/// # Arguments
/// * `input` - The text after the `!` prefix
///
/// # Example
/// ```
/// use event_herald::commands::bang::parse_bang_command;
///
/// let cmd = parse_bang_command("add Movie 2030-01-01 20:00");
/// assert_eq!(cmd.name, "add");
/// assert_eq!(cmd.args, vec!["Movie", "2030-01-01", "20:00"]);
/// ```
pub fn parse_bang_command(input: &str) -> BangCommand {
    let mut parts = input.split_whitespace();

    let name = parts.next().unwrap_or("").to_string();
    let args: Vec<String> = parts.map(|s| s.to_string()).collect();

    BangCommand { name, args }
}

/// A fully validated command, ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Vox,
    Add {
        name: String,
        date: String,
        time: String,
    },
    SetReminder {
        name: String,
        minutes: u32,
    },
    Delete {
        name: String,
    },
    Events,
}

/// Turn a raw chat message into a command.
///
/// Returns `None` for anything that is not a recognised command, and
/// `Some(Err(..))` when a recognised command has bad arguments.
pub fn parse_command(content: &str) -> Option<Result<Command, CommandError>> {
    let content = content.trim();

    if content.eq_ignore_ascii_case(quick::VOX) {
        return Some(Ok(Command::Vox));
    }

    let input = content.strip_prefix(PREFIX)?;
    let cmd = parse_bang_command(input);

    // Zero-argument commands only count when they are the whole message
    if cmd.args.is_empty() {
        if cmd.is("ping") {
            return Some(Ok(Command::Ping));
        }
        if cmd.is("events") {
            return Some(Ok(Command::Events));
        }
    }

    match cmd.name.as_str() {
        "add" => Some(events::add(&cmd)),
        "setreminder" | "set-reminder" => Some(events::set_reminder(&cmd)),
        "delete" => Some(events::delete(&cmd)),
        _ => None,
    }
}
