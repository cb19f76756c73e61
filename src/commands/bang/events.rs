//! Event bang commands: !add, !setreminder, !delete

use super::{BangCommand, Command};
use crate::error::CommandError;

pub const ADD_USAGE: &str = "!add EventName YYYY-MM-DD HH:MM";
pub const SET_REMINDER_USAGE: &str = "!setreminder EventName MinutesBeforeEvent";
pub const DELETE_USAGE: &str = "!delete EventName";

/// `!add <name> <date> <time>`; anything after the time is ignored
pub fn add(cmd: &BangCommand) -> Result<Command, CommandError> {
    match cmd.args.as_slice() {
        [name, date, time, ..] => Ok(Command::Add {
            name: name.clone(),
            date: date.clone(),
            time: time.clone(),
        }),
        _ => Err(CommandError::MalformedCommand { usage: ADD_USAGE }),
    }
}

/// `!setreminder <name> <minutes>`
pub fn set_reminder(cmd: &BangCommand) -> Result<Command, CommandError> {
    let [name, minutes] = cmd.args.as_slice() else {
        return Err(CommandError::MalformedCommand {
            usage: SET_REMINDER_USAGE,
        });
    };

    let minutes = parse_minutes(minutes)?;

    Ok(Command::SetReminder {
        name: name.clone(),
        minutes,
    })
}

/// `!delete <name>`
pub fn delete(cmd: &BangCommand) -> Result<Command, CommandError> {
    match cmd.args.as_slice() {
        [name] => Ok(Command::Delete { name: name.clone() }),
        _ => Err(CommandError::MalformedCommand {
            usage: DELETE_USAGE,
        }),
    }
}

/// Lead time in whole minutes; negative or non-numeric input is rejected
pub fn parse_minutes(input: &str) -> Result<u32, CommandError> {
    input
        .parse::<u32>()
        .map_err(|_| CommandError::InvalidReminderMinutes(input.to_string()))
}
