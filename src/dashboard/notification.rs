//! Transient operator notifications
//!
//! Every command result becomes a notification that dismisses itself after a
//! fixed TTL. The controller owns the [`NotificationCenter`]; expiry is driven
//! by timer tasks that send the id back into the controller loop.

use serde::Serialize;
use uuid::Uuid;

/// Notification level, mirrors the indicator palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Level::Success, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(Level::Danger, message)
    }
}

/// Currently visible notifications, oldest first
#[derive(Debug, Default)]
pub struct NotificationCenter {
    active: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows a notification and returns its id for later dismissal
    pub fn push(&mut self, notification: Notification) -> Uuid {
        let id = notification.id;
        self.active.push(notification);
        id
    }

    /// Removes a notification; unknown ids are ignored
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        self.active.len() != before
    }

    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_dismiss() {
        let mut center = NotificationCenter::new();
        let a = center.push(Notification::success("one"));
        let b = center.push(Notification::danger("two"));
        assert_eq!(center.active().len(), 2);

        assert!(center.dismiss(a));
        assert_eq!(center.active().len(), 1);
        assert_eq!(center.active()[0].id, b);

        // Already gone
        assert!(!center.dismiss(a));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Notification::success("same");
        let b = Notification::success("same");
        assert_ne!(a.id, b.id);
    }
}
