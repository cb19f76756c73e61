//! # Feature: Event Store
//!
//! In-memory registry of scheduled events. Events live for the lifetime of the
//! process and are kept in insertion order; listings are sorted on read.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial release with create, lookup, delete and sorted listing

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};

use crate::error::CommandError;

pub type EventId = u64;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// Date exactly as the user typed it
    pub date: String,
    /// Time of day exactly as the user typed it
    pub time: String,
    pub starts_at: DateTime<Utc>,
    pub reminder_lead_minutes: Option<u32>,
    pub created_by: String,
}

impl Event {
    /// Short reminder status used in listings
    pub fn reminder_text(&self) -> String {
        match self.reminder_lead_minutes {
            Some(minutes) => format!("{} minutes before", minutes),
            None => "no reminder set".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventStore {
    events: Vec<Event>,
    next_id: EventId,
    offset: FixedOffset,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl EventStore {
    /// Creates an empty store that reads dates and times in `offset`
    pub fn new(offset: FixedOffset) -> Self {
        EventStore {
            events: Vec::new(),
            next_id: 1,
            offset,
        }
    }

    /// Resolve a typed date and time into an absolute instant
    pub fn parse_start(&self, date: &str, time: &str) -> Result<DateTime<Utc>, CommandError> {
        let invalid = || CommandError::InvalidDateTime {
            date: date.to_string(),
            time: time.to_string(),
        };

        let day = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| invalid())?;
        let time_of_day = TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(time, format).ok())
            .ok_or_else(invalid)?;

        self.offset
            .from_local_datetime(&NaiveDateTime::new(day, time_of_day))
            .single()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(invalid)
    }

    /// Append a new event. Names are not required to be unique.
    pub fn create(
        &mut self,
        name: &str,
        date: &str,
        time: &str,
        created_by: &str,
    ) -> Result<Event, CommandError> {
        let starts_at = self.parse_start(date, time)?;

        let event = Event {
            id: self.next_id,
            name: name.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            starts_at,
            reminder_lead_minutes: None,
            created_by: created_by.to_string(),
        };
        self.next_id += 1;
        self.events.push(event.clone());

        Ok(event)
    }

    /// First event with exactly this name, in insertion order
    pub fn find_by_name(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }

    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut Event> {
        self.events.iter_mut().find(|e| e.name == name)
    }

    /// Remove the first event with this name and hand it back
    pub fn delete(&mut self, name: &str) -> Option<Event> {
        let index = self.events.iter().position(|e| e.name == name)?;
        Some(self.events.remove(index))
    }

    /// Events ordered by start time. Ties keep insertion order and the
    /// stored order is left untouched.
    pub fn list_sorted(&self) -> Vec<&Event> {
        let mut sorted: Vec<&Event> = self.events.iter().collect();
        sorted.sort_by_key(|e| e.starts_at);
        sorted
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
