//! # Feature: Announcements
//!
//! Delivers broadcasts to every configured announcement channel. Each channel
//! is tried independently; a failure on one never stops the others.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Text and embed listing broadcasts, reminder delivery

use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::id::ChannelId;
use std::sync::Arc;

use crate::announcement::{Announcement, EventListing, LISTING_COLOUR};
use crate::reminder_scheduler::{Reminder, ReminderNotifier};

pub const EVERYONE_MENTION: &str = "@everyone";

#[derive(Clone)]
pub struct Announcer {
    http: Arc<Http>,
    channels: Vec<ChannelId>,
    mention_everyone: bool,
}

impl Announcer {
    pub fn new(http: Arc<Http>, channel_ids: &[u64], mention_everyone: bool) -> Self {
        Announcer {
            http,
            channels: channel_ids.iter().map(|id| ChannelId(*id)).collect(),
            mention_everyone,
        }
    }

    /// Send to every announcement channel. Returns how many accepted it.
    pub async fn broadcast(&self, announcement: &Announcement) -> usize {
        let mut delivered = 0;

        for channel in &self.channels {
            match self.send_to(*channel, announcement).await {
                Ok(_) => delivered += 1,
                Err(e) => warn!("⚠️ Failed to announce in channel {}: {}", channel, e),
            }
        }

        debug!(
            "📣 Announcement delivered to {}/{} channel(s)",
            delivered,
            self.channels.len()
        );
        delivered
    }

    async fn send_to(&self, channel: ChannelId, announcement: &Announcement) -> Result<Message> {
        match announcement {
            Announcement::Text(text) => {
                let content = with_mention(self.mention_everyone, text);
                Ok(channel.say(&self.http, content).await?)
            }
            Announcement::Listing(listing) => match self.send_embed(channel, listing).await {
                Ok(message) => Ok(message),
                Err(e) => {
                    // Channels without embed permission still get the plain listing
                    warn!("⚠️ Embed rejected in channel {}, sending plain text: {}", channel, e);
                    let content = with_mention(self.mention_everyone, &listing.to_text());
                    Ok(channel.say(&self.http, content).await?)
                }
            },
        }
    }

    async fn send_embed(&self, channel: ChannelId, listing: &EventListing) -> serenity::Result<Message> {
        let mention = self.mention_everyone;
        channel
            .send_message(&self.http, |m| {
                if mention {
                    m.content(EVERYONE_MENTION);
                }
                m.embed(|e| {
                    e.title(&listing.title).colour(LISTING_COLOUR);
                    for entry in &listing.entries {
                        e.field(entry.field_name(), entry.field_value(), false);
                    }
                    e
                })
            })
            .await
    }
}

#[async_trait]
impl ReminderNotifier for Announcer {
    async fn notify(&self, reminder: &Reminder) -> Result<()> {
        let delivered = self.broadcast(&Announcement::text(reminder.message())).await;
        if delivered == 0 {
            return Err(anyhow!("no announcement channel accepted the reminder"));
        }
        info!(
            "✅ Delivered reminder for \"{}\" to {} channel(s)",
            reminder.name, delivered
        );
        Ok(())
    }
}

/// Prefix `text` with the everyone mention when enabled
pub fn with_mention(mention_everyone: bool, text: &str) -> String {
    if mention_everyone {
        format!("{} {}", EVERYONE_MENTION, text)
    } else {
        text.to_string()
    }
}
