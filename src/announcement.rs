//! Payloads broadcast to the announcement channels.

use serde::Serialize;

use crate::event_store::Event;

pub const LISTING_TITLE: &str = "📅 Upcoming Events";
pub const LISTING_COLOUR: u32 = 0x00ae86;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    /// 1-based position in start-time order
    pub position: usize,
    pub name: String,
    pub date: String,
    pub time: String,
    pub reminder_text: String,
    pub created_by: String,
    #[serde(skip)]
    has_reminder: bool,
}

impl ListingEntry {
    pub fn field_name(&self) -> String {
        format!("{}. {}", self.position, self.name)
    }

    pub fn field_value(&self) -> String {
        let reminder = if self.has_reminder {
            format!("Reminder: {}", self.reminder_text)
        } else {
            "No reminder set".to_string()
        };
        format!(
            "{} at {} ({}, added by {})",
            self.date, self.time, reminder, self.created_by
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventListing {
    pub title: String,
    pub entries: Vec<ListingEntry>,
}

impl EventListing {
    /// Build a listing from events already in display order
    pub fn from_sorted(events: &[&Event]) -> Self {
        let entries = events
            .iter()
            .enumerate()
            .map(|(index, event)| ListingEntry {
                position: index + 1,
                name: event.name.clone(),
                date: event.date.clone(),
                time: event.time.clone(),
                reminder_text: event.reminder_text(),
                created_by: event.created_by.clone(),
                has_reminder: event.reminder_lead_minutes.is_some(),
            })
            .collect();

        EventListing {
            title: LISTING_TITLE.to_string(),
            entries,
        }
    }

    /// Plain-text rendering, one line per entry
    pub fn to_text(&self) -> String {
        let mut output = format!("**{}**\n", self.title);
        for entry in &self.entries {
            output.push_str(&format!("{} - {}\n", entry.field_name(), entry.field_value()));
        }
        output
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Announcement {
    Text(String),
    Listing(EventListing),
}

impl Announcement {
    pub fn text(content: impl Into<String>) -> Self {
        Announcement::Text(content.into())
    }
}
