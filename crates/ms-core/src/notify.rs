//! Transient notifications surfaced to the operator.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default number of notifications retained before the oldest is dropped.
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            detail: None,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Bounded FIFO of pending notifications, drained by the UI.
#[derive(Debug, Clone)]
pub struct Notifications {
    queue: VecDeque<Notification>,
    capacity: usize,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_NOTIFICATION_CAPACITY)
    }
}

impl Notifications {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity.min(DEFAULT_NOTIFICATION_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, notification: Notification) {
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(notification);
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn last(&self) -> Option<&Notification> {
        self.queue.back()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_is_dropped_at_capacity() {
        let mut queue = Notifications::with_capacity(2);
        queue.push(Notification::info("one"));
        queue.push(Notification::info("two"));
        queue.push(Notification::info("three"));

        let titles: Vec<_> = queue.drain().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["two", "three"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn detail_is_optional() {
        let n = Notification::error("OPC Connect Failed").with_detail("HTTP 503");
        assert_eq!(n.level, NotificationLevel::Error);
        assert_eq!(n.detail.as_deref(), Some("HTTP 503"));
    }
}
