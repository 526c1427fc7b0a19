// Transient user-facing notifications (toast messages).

use chrono::{DateTime, Utc};
use strum::Display;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Fan-out of notifications. Sending with no subscribers is not an error;
/// the message is simply dropped.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(NotificationLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(NotificationLevel::Error, message.into());
    }

    fn send(&self, level: NotificationLevel, message: String) {
        match level {
            NotificationLevel::Success => info!(%message, "notification"),
            NotificationLevel::Error => warn!(%message, "notification"),
        }
        let note = Notification {
            level,
            message,
            at: Utc::now(),
        };
        if self.tx.send(note).is_err() {
            debug!("notification dropped, no subscribers");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_in_order() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();
        notifier.success("saved");
        notifier.error("failed");

        let first = rx.recv().await.unwrap();
        assert_eq!(first.level, NotificationLevel::Success);
        assert_eq!(first.message, "saved");
        assert_eq!(rx.recv().await.unwrap().level, NotificationLevel::Error);
    }

    #[test]
    fn sending_without_subscribers_is_fine() {
        Notifier::new().success("nobody listening");
    }
}
