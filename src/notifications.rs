//! Notification feed
//!
//! Alerts shown in the notification center, persisted under `notifications`.
//! Timestamps are stored as absolute dates and rendered relative to the
//! current time with [`format_timestamp`].

use crate::error::DashboardError;
use crate::store::{read_json, write_json, KeyValueStore, StorageKey};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Alert,
    Info,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

/// Feed shown before anything was stored, anchored at `now`
pub fn default_notifications(now: DateTime<Utc>) -> Vec<Notification> {
    vec![
        Notification {
            id: "1".to_string(),
            title: "Sleep Goal Achieved".to_string(),
            message: "You reached your sleep goal for 5 consecutive days!".to_string(),
            timestamp: now - Duration::hours(1),
            read: false,
            kind: NotificationKind::Success,
        },
        Notification {
            id: "2".to_string(),
            title: "High Heart Rate".to_string(),
            message: "Your heart rate was above normal range for 30 minutes today.".to_string(),
            timestamp: now - Duration::hours(2),
            read: false,
            kind: NotificationKind::Alert,
        },
        Notification {
            id: "3".to_string(),
            title: "New Feature Available".to_string(),
            message: "Try our new stress tracking feature in the dashboard.".to_string(),
            timestamp: now - Duration::days(1),
            read: true,
            kind: NotificationKind::Info,
        },
    ]
}

/// Relative label: `Nm ago` under an hour, `Nh ago` under a day, else `Nd ago`.
/// Future timestamps count as `0m ago`.
pub fn format_timestamp(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    let minutes = elapsed.num_minutes().max(0);

    if minutes < 60 {
        format!("{minutes}m ago")
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}

/// Notification feed stored under `notifications`
pub struct NotificationFeed<'s, S: KeyValueStore + ?Sized> {
    store: &'s mut S,
}

impl<'s, S: KeyValueStore + ?Sized> NotificationFeed<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// Stored notifications, newest first. Falls back to the default feed.
    pub fn list(&self) -> Vec<Notification> {
        match read_json(&*self.store, StorageKey::Notifications) {
            Ok(Some(notifications)) => notifications,
            Ok(None) => default_notifications(Utc::now()),
            Err(e) => {
                warn!(error = %e, "stored notifications are malformed, using defaults");
                default_notifications(Utc::now())
            }
        }
    }

    pub fn unread_count(&self) -> usize {
        self.list().iter().filter(|n| !n.read).count()
    }

    /// Mark every notification as read. Returns how many were unread.
    pub fn mark_all_read(&mut self) -> Result<usize, DashboardError> {
        let mut notifications = self.list();
        let mut marked = 0;
        for notification in notifications.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            marked += 1;
        }

        write_json(&mut *self.store, StorageKey::Notifications, &notifications)?;
        info!(marked, "marked notifications as read");
        Ok(marked)
    }

    pub fn remove(&mut self, id: &str) -> Result<Notification, DashboardError> {
        let mut notifications = self.list();
        let index = notifications
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| DashboardError::UnknownNotification(id.to_string()))?;
        let removed = notifications.remove(index);

        write_json(&mut *self.store, StorageKey::Notifications, &notifications)?;
        Ok(removed)
    }
}
