use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::announcement::{Announcement, EventListing};
use crate::commands::bang::{parse_command, quick, Command};
use crate::error::CommandError;
use crate::event_store::EventStore;
use crate::reminder_scheduler::ReminderScheduler;

const NO_EVENTS_REPLY: &str = "📅 No events found.";
const NO_UPCOMING_EVENTS: &str = "📅 No upcoming events at the moment.";

/// Who sent a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    /// Shown in listings, e.g. `alice#0001`
    pub tag: String,
    /// Shown in confirmations
    pub username: String,
}

/// What the transport should do after a command ran
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Sent back to the channel the command came from
    pub reply: Option<String>,
    /// Sent to every announcement channel
    pub announcement: Option<Announcement>,
}

impl CommandOutcome {
    pub fn reply(text: impl Into<String>) -> Self {
        CommandOutcome {
            reply: Some(text.into()),
            announcement: None,
        }
    }

    pub fn announce(announcement: Announcement) -> Self {
        CommandOutcome {
            reply: None,
            announcement: Some(announcement),
        }
    }

    fn and_announce(mut self, announcement: Announcement) -> Self {
        self.announcement = Some(announcement);
        self
    }
}

#[derive(Clone)]
pub struct CommandHandler {
    store: Arc<Mutex<EventStore>>,
    scheduler: ReminderScheduler,
    cancel_reminders_on_delete: bool,
}

impl CommandHandler {
    pub fn new(
        store: EventStore,
        scheduler: ReminderScheduler,
        cancel_reminders_on_delete: bool,
    ) -> Self {
        CommandHandler {
            store: Arc::new(Mutex::new(store)),
            scheduler,
            cancel_reminders_on_delete,
        }
    }

    /// Interpret one message from the command channel.
    ///
    /// Returns `None` when the message is not a command. Validation failures
    /// come back as a reply carrying the error text.
    pub async fn handle_message(
        &self,
        content: &str,
        requester: &Requester,
        now: DateTime<Utc>,
    ) -> Option<CommandOutcome> {
        let Some(parsed) = parse_command(content) else {
            debug!("Ignoring non-command message from {}", requester.tag);
            return None;
        };

        let result = match parsed {
            Ok(command) => {
                info!("Processing command {:?} from {}", command, requester.tag);
                self.execute(command, requester, now).await
            }
            Err(e) => Err(e),
        };

        Some(result.unwrap_or_else(|e| {
            info!("Command from {} rejected: {:?}", requester.tag, e);
            CommandOutcome::reply(e.to_string())
        }))
    }

    pub async fn execute(
        &self,
        command: Command,
        requester: &Requester,
        now: DateTime<Utc>,
    ) -> Result<CommandOutcome, CommandError> {
        match command {
            Command::Ping => Ok(CommandOutcome::announce(Announcement::text(quick::ping()))),
            Command::Vox => Ok(CommandOutcome::announce(Announcement::text(quick::vox()))),
            Command::Add { name, date, time } => self.add(&name, &date, &time, requester).await,
            Command::SetReminder { name, minutes } => self.set_reminder(&name, minutes, now).await,
            Command::Delete { name } => self.delete(&name).await,
            Command::Events => Ok(self.events().await),
        }
    }

    async fn add(
        &self,
        name: &str,
        date: &str,
        time: &str,
        requester: &Requester,
    ) -> Result<CommandOutcome, CommandError> {
        let mut store = self.store.lock().await;
        store.create(name, date, time, &requester.tag)?;

        let listing = EventListing::from_sorted(&store.list_sorted());
        Ok(CommandOutcome::reply(format!(
            "✅ Event \"{}\" added for {} at {} by {}!",
            name, date, time, requester.username
        ))
        .and_announce(Announcement::Listing(listing)))
    }

    async fn set_reminder(
        &self,
        name: &str,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<CommandOutcome, CommandError> {
        let mut store = self.store.lock().await;
        let event = store
            .find_by_name_mut(name)
            .ok_or_else(|| CommandError::EventNotFound(name.to_string()))?;

        self.scheduler.arm(event, minutes, now)?;

        Ok(CommandOutcome::reply(format!(
            "✅ Reminder set for event \"{}\" {} minutes before it starts.",
            name, minutes
        )))
    }

    async fn delete(&self, name: &str) -> Result<CommandOutcome, CommandError> {
        let mut store = self.store.lock().await;
        let deleted = store
            .delete(name)
            .ok_or_else(|| CommandError::EventNotFound(name.to_string()))?;

        if self.cancel_reminders_on_delete {
            let cancelled = self.scheduler.cancel_for_event(deleted.id);
            if cancelled > 0 {
                info!("Cancelled {} reminder(s) for deleted event \"{}\"", cancelled, name);
            }
        }

        let announcement = if store.is_empty() {
            Announcement::text(NO_UPCOMING_EVENTS)
        } else {
            Announcement::Listing(EventListing::from_sorted(&store.list_sorted()))
        };

        Ok(CommandOutcome::reply(format!("✅ Event \"{}\" has been deleted.", name))
            .and_announce(announcement))
    }

    async fn events(&self) -> CommandOutcome {
        let store = self.store.lock().await;
        if store.is_empty() {
            return CommandOutcome::reply(NO_EVENTS_REPLY);
        }

        CommandOutcome::announce(Announcement::Listing(EventListing::from_sorted(
            &store.list_sorted(),
        )))
    }

    #[cfg(test)]
    async fn find_event(&self, name: &str) -> Option<crate::event_store::Event> {
        self.store.lock().await.find_by_name(name).cloned()
    }

    #[cfg(test)]
    async fn event_count(&self) -> usize {
        self.store.lock().await.len()
    }

    #[cfg(test)]
    fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }
}
