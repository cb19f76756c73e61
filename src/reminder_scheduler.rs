//! # Feature: Reminders
//!
//! One-shot reminders armed against events. Each armed reminder is its own
//! tokio task sleeping until the fire time; pending reminders can be cancelled
//! individually or per event.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Cancellation handles for pending reminders
//! - 1.0.0: Initial release with per-event lead times

use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use log::{debug, info, warn};
use serenity::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::CommandError;
use crate::event_store::{Event, EventId};

/// Snapshot of an event taken when its reminder was armed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub id: Uuid,
    pub event_id: EventId,
    pub name: String,
    pub date: String,
    pub time: String,
    pub created_by: String,
    pub lead_minutes: u32,
    pub fire_at: DateTime<Utc>,
}

impl Reminder {
    pub fn message(&self) -> String {
        format!(
            "⏰ Reminder: **{}** is starting at {} {} (added by {})!",
            self.name, self.date, self.time, self.created_by
        )
    }
}

/// Receives reminders when they fire
#[async_trait]
pub trait ReminderNotifier: Send + Sync + 'static {
    async fn notify(&self, reminder: &Reminder) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedReminder {
    pub id: Uuid,
    pub fire_at: DateTime<Utc>,
    pub delay: Duration,
}

struct PendingReminder {
    event_id: EventId,
    cancel: oneshot::Sender<()>,
}

#[derive(Clone)]
pub struct ReminderScheduler {
    notifier: Arc<dyn ReminderNotifier>,
    pending: Arc<DashMap<Uuid, PendingReminder>>,
}

/// `starts_at` minus the lead time, if that is representable
pub fn fire_instant(starts_at: DateTime<Utc>, lead_minutes: u32) -> Option<DateTime<Utc>> {
    starts_at.checked_sub_signed(ChronoDuration::minutes(i64::from(lead_minutes)))
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn ReminderNotifier>) -> Self {
        Self {
            notifier,
            pending: Arc::new(DashMap::new()),
        }
    }

    /// Arm a reminder `lead_minutes` before `event` starts.
    ///
    /// Fails without scheduling anything or touching `event` when the fire
    /// time is not strictly after `now`. Arming again adds another reminder
    /// alongside any already pending. Must be called inside a tokio runtime.
    pub fn arm(
        &self,
        event: &mut Event,
        lead_minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<ArmedReminder, CommandError> {
        let fire_at = fire_instant(event.starts_at, lead_minutes)
            .filter(|fire_at| *fire_at > now)
            .ok_or(CommandError::PastOrTooClose)?;
        let delay = (fire_at - now)
            .to_std()
            .map_err(|_| CommandError::PastOrTooClose)?;

        let reminder = Reminder {
            id: Uuid::new_v4(),
            event_id: event.id,
            name: event.name.clone(),
            date: event.date.clone(),
            time: event.time.clone(),
            created_by: event.created_by.clone(),
            lead_minutes,
            fire_at,
        };
        let id = reminder.id;

        let (cancel, cancelled) = oneshot::channel();
        self.pending.insert(
            id,
            PendingReminder {
                event_id: event.id,
                cancel,
            },
        );

        let sleep = tokio::time::sleep(delay);
        let pending = Arc::clone(&self.pending);
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            tokio::select! {
                _ = sleep => {
                    // Whoever removes the entry owns delivery
                    if pending.remove(&reminder.id).is_none() {
                        return;
                    }
                    info!("⏰ Firing reminder {} for event \"{}\"", reminder.id, reminder.name);
                    if let Err(e) = notifier.notify(&reminder).await {
                        warn!("⚠️ Failed to deliver reminder {}: {}", reminder.id, e);
                    }
                }
                _ = cancelled => {
                    debug!("⏰ Reminder {} cancelled", reminder.id);
                }
            }
        });

        event.reminder_lead_minutes = Some(lead_minutes);
        info!(
            "⏰ Armed reminder {} for event \"{}\" at {} (in {:?})",
            id, event.name, fire_at, delay
        );

        Ok(ArmedReminder { id, fire_at, delay })
    }

    /// Cancel one pending reminder. Returns false if it already fired.
    pub fn cancel(&self, id: Uuid) -> bool {
        match self.pending.remove(&id) {
            Some((_, reminder)) => {
                let _ = reminder.cancel.send(());
                true
            }
            None => false,
        }
    }

    /// Cancel every pending reminder armed for `event_id`
    pub fn cancel_for_event(&self, event_id: EventId) -> usize {
        let ids: Vec<Uuid> = self
            .pending
            .iter()
            .filter(|entry| entry.value().event_id == event_id)
            .map(|entry| *entry.key())
            .collect();

        ids.into_iter().filter(|id| self.cancel(*id)).count()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_for_event(&self, event_id: EventId) -> usize {
        self.pending
            .iter()
            .filter(|entry| entry.value().event_id == event_id)
            .count()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::event_store::EventStore;
    use chrono::TimeZone;
    use tokio::sync::mpsc;
    use tokio::time::{sleep, timeout};

    pub(crate) struct ChannelNotifier {
        tx: mpsc::UnboundedSender<Reminder>,
    }

    impl ChannelNotifier {
        pub(crate) fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Reminder>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (Arc::new(Self { tx }), rx)
        }
    }

    #[async_trait]
    impl ReminderNotifier for ChannelNotifier {
        async fn notify(&self, reminder: &Reminder) -> Result<()> {
            self.tx.send(reminder.clone())?;
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl ReminderNotifier for FailingNotifier {
        async fn notify(&self, _reminder: &Reminder) -> Result<()> {
            Err(anyhow::anyhow!("announcement channel unreachable"))
        }
    }

    const A_FEW_DAYS: Duration = Duration::from_secs(3 * 86_400);

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2029, 12, 31, 12, 0, 0).unwrap()
    }

    fn movie(store: &mut EventStore) -> Event {
        store.create("Movie", "2030-01-01", "20:00", "alice").unwrap()
    }

    #[test]
    fn test_fire_instant() {
        let start = Utc.with_ymd_and_hms(2030, 1, 1, 20, 0, 0).unwrap();
        assert_eq!(
            fire_instant(start, 30),
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 19, 30, 0).unwrap())
        );
        assert_eq!(fire_instant(start, 0), Some(start));
    }

    #[test]
    fn test_reminder_message() {
        let reminder = Reminder {
            id: Uuid::nil(),
            event_id: 1,
            name: "Movie".to_string(),
            date: "2030-01-01".to_string(),
            time: "20:00".to_string(),
            created_by: "alice".to_string(),
            lead_minutes: 30,
            fire_at: now(),
        };
        assert_eq!(
            reminder.message(),
            "⏰ Reminder: **Movie** is starting at 2030-01-01 20:00 (added by alice)!"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reminder_fires_once_at_fire_time() {
        let (notifier, mut rx) = ChannelNotifier::new();
        let scheduler = ReminderScheduler::new(notifier);
        let mut store = EventStore::default();
        let mut event = movie(&mut store);

        // 30 minutes before the event is 60 seconds from now
        let now = event.starts_at - ChronoDuration::minutes(31);
        let armed = scheduler.arm(&mut event, 30, now).unwrap();

        assert_eq!(armed.delay, Duration::from_secs(60));
        assert_eq!(event.reminder_lead_minutes, Some(30));
        assert_eq!(scheduler.pending_count(), 1);

        sleep(Duration::from_secs(59)).await;
        assert!(rx.try_recv().is_err());

        let reminder = timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reminder.name, "Movie");
        assert_eq!(reminder.event_id, event.id);
        assert_eq!(reminder.id, armed.id);

        sleep(Duration::from_secs(3600)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_fire_time_is_rejected() {
        let (notifier, mut rx) = ChannelNotifier::new();
        let scheduler = ReminderScheduler::new(notifier);
        let mut store = EventStore::default();
        let mut event = store.create("A", "2020-01-01", "10:00", "bob").unwrap();

        let err = scheduler.arm(&mut event, 5, now()).unwrap_err();
        assert_eq!(err, CommandError::PastOrTooClose);
        assert_eq!(event.reminder_lead_minutes, None);
        assert_eq!(scheduler.pending_count(), 0);

        sleep(Duration::from_secs(3600)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_time_equal_to_now_is_rejected() {
        let (notifier, _rx) = ChannelNotifier::new();
        let scheduler = ReminderScheduler::new(notifier);
        let mut store = EventStore::default();
        let mut event = movie(&mut store);

        let now = event.starts_at - ChronoDuration::minutes(10);
        assert_eq!(
            scheduler.arm(&mut event, 10, now),
            Err(CommandError::PastOrTooClose)
        );
        assert_eq!(event.reminder_lead_minutes, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_lead_time_is_rejected() {
        let (notifier, _rx) = ChannelNotifier::new();
        let scheduler = ReminderScheduler::new(notifier);
        let mut store = EventStore::default();
        let mut event = movie(&mut store);

        assert_eq!(
            scheduler.arm(&mut event, u32::MAX, now()),
            Err(CommandError::PastOrTooClose)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearming_keeps_both_reminders() {
        let (notifier, mut rx) = ChannelNotifier::new();
        let scheduler = ReminderScheduler::new(notifier);
        let mut store = EventStore::default();
        let mut event = movie(&mut store);

        scheduler.arm(&mut event, 30, now()).unwrap();
        scheduler.arm(&mut event, 10, now()).unwrap();
        assert_eq!(event.reminder_lead_minutes, Some(10));
        assert_eq!(scheduler.pending_for_event(event.id), 2);

        let first = timeout(A_FEW_DAYS, rx.recv()).await.unwrap().unwrap();
        let second = timeout(A_FEW_DAYS, rx.recv()).await.unwrap().unwrap();
        assert_eq!(first.lead_minutes, 30);
        assert_eq!(second.lead_minutes, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_for_event_stops_delivery() {
        let (notifier, mut rx) = ChannelNotifier::new();
        let scheduler = ReminderScheduler::new(notifier);
        let mut store = EventStore::default();
        let mut event = movie(&mut store);
        let mut other = store.create("Raid", "2030-01-01", "21:00", "bob").unwrap();

        scheduler.arm(&mut event, 30, now()).unwrap();
        scheduler.arm(&mut event, 15, now()).unwrap();
        scheduler.arm(&mut other, 30, now()).unwrap();

        assert_eq!(scheduler.cancel_for_event(event.id), 2);
        assert_eq!(scheduler.pending_count(), 1);

        let delivered = timeout(A_FEW_DAYS, rx.recv()).await.unwrap().unwrap();
        assert_eq!(delivered.name, "Raid");

        sleep(A_FEW_DAYS).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_fire_reports_false() {
        let (notifier, mut rx) = ChannelNotifier::new();
        let scheduler = ReminderScheduler::new(notifier);
        let mut store = EventStore::default();
        let mut event = movie(&mut store);

        let armed = scheduler.arm(&mut event, 30, now()).unwrap();
        timeout(A_FEW_DAYS, rx.recv()).await.unwrap().unwrap();

        assert!(!scheduler.cancel(armed.id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifier_failure_is_not_retried() {
        let scheduler = ReminderScheduler::new(Arc::new(FailingNotifier));
        let mut store = EventStore::default();
        let mut event = movie(&mut store);

        scheduler.arm(&mut event, 30, now()).unwrap();
        sleep(A_FEW_DAYS).await;

        assert_eq!(scheduler.pending_count(), 0);
    }
}
