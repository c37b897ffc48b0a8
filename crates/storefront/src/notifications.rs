//! Transient user-facing notifications.
//!
//! Stores publish a [`Notice`] after every mutation; front ends subscribe and
//! render them however they like (the CLI prints them).

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::debug;

/// Notices buffered per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 64;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

impl NoticeLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single transient message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// How long a front end should keep the notice visible.
    pub auto_close: Duration,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            auto_close: Duration::from_secs(2),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            auto_close: Duration::from_secs(2),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            auto_close: Duration::from_secs(3),
        }
    }
}

/// Broadcast hub for notices. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Notifications {
    sender: broadcast::Sender<Notice>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifications {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Receive every notice published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    /// Publish a notice. Dropped silently when nobody is listening.
    pub fn notify(&self, notice: Notice) {
        debug!(level = %notice.level, message = %notice.message, "Notice");
        let _ = self.sender.send(notice);
    }
}
