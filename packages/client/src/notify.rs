use std::time::Duration;

/// Default lifetime of a toast.
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationLevel {
    pub fn icon(self) -> &'static str {
        match self {
            NotificationLevel::Success => "✅",
            NotificationLevel::Error => "❌",
            NotificationLevel::Warning => "⚠️",
            NotificationLevel::Info => "ℹ️",
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            NotificationLevel::Success => "notification-success",
            NotificationLevel::Error => "notification-error",
            NotificationLevel::Warning => "notification-warning",
            NotificationLevel::Info => "notification-info",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
}

/// Transient toast queue. The view removes an entry by id when its timer
/// fires or when it is clicked.
#[derive(Clone, Debug)]
pub struct Notifications {
    items: Vec<Notification>,
    next_id: u64,
    timeout: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(NOTIFICATION_TIMEOUT)
    }
}

impl Notifications {
    pub fn new(timeout: Duration) -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            timeout,
        }
    }

    pub fn push(&mut self, level: NotificationLevel, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Notification {
            id,
            level,
            message: message.into(),
        });
        id
    }

    /// Returns `false` if the toast was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_dismiss() {
        let mut toasts = Notifications::default();
        assert_eq!(toasts.timeout(), Duration::from_secs(5));

        let first = toasts.push(NotificationLevel::Success, "Login successful!");
        let second = toasts.push(NotificationLevel::Warning, "Please fill in all fields");
        assert_ne!(first, second);
        assert_eq!(toasts.items().len(), 2);
        assert_eq!(toasts.latest().unwrap().level.class(), "notification-warning");

        assert!(toasts.dismiss(first));
        assert!(!toasts.dismiss(first));
        assert_eq!(toasts.items()[0].id, second);
    }

    #[test]
    fn test_ids_are_not_reused_after_clear() {
        let mut toasts = Notifications::new(Duration::from_secs(2));
        let id = toasts.push(NotificationLevel::Info, "one");
        toasts.clear();
        assert!(toasts.items().is_empty());
        assert!(toasts.push(NotificationLevel::Error, "two") > id);
    }
}
