use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    Info,
    Error,
}

/// A toast-style message surfaced to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppNotification {
    pub id: String,
    pub notification_type: NotificationType,
    pub title: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl AppNotification {
    pub fn new(notification_type: NotificationType, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            notification_type,
            title: None,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationType::Error, message)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Notifications the withdraw flow raised, newest first. Holds at most
/// `capacity` entries; older ones are dropped.
#[derive(Debug)]
pub struct NotificationStore {
    entries: VecDeque<AppNotification>,
    capacity: usize,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, notification: AppNotification) {
        self.entries.push_front(notification);
        self.entries.truncate(self.capacity);
    }

    pub fn latest(&self) -> Option<&AppNotification> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppNotification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}
