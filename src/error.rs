use thiserror::Error;

/// Failures a command can report back to the channel it came from.
///
/// The `Display` text is the reply the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("❌ Invalid format! Use: `{usage}`")]
    MalformedCommand { usage: &'static str },

    #[error("❌ Invalid date or time format!")]
    InvalidDateTime { date: String, time: String },

    #[error("❌ Invalid reminder time! It must be a non-negative number.")]
    InvalidReminderMinutes(String),

    #[error("❌ Event \"{0}\" not found.")]
    EventNotFound(String),

    #[error("❌ The reminder time is in the past or too close to the event start time.")]
    PastOrTooClose,
}
