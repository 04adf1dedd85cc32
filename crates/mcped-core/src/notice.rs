//! User-visible notices.
//!
//! At most one notice is shown at a time. Posting replaces whatever is shown,
//! and a notice expires after a fixed lifetime.

use std::fmt;
use std::time::{Duration, Instant};

pub const DEFAULT_NOTICE_LIFETIME: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Error => write!(f, "Error: {}", self.message),
            NoticeLevel::Success | NoticeLevel::Warning => f.write_str(&self.message),
        }
    }
}

/// Holds the single live notice.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    lifetime: Duration,
    current: Option<(Notice, Instant)>,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_LIFETIME)
    }
}

impl NoticeBoard {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            current: None,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn post(&mut self, notice: Notice) {
        self.post_at(notice, Instant::now());
    }

    pub fn post_at(&mut self, notice: Notice, now: Instant) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!(text = %notice.message, "notice posted"),
            _ => tracing::info!(text = %notice.message, "notice posted"),
        }
        self.current = Some((notice, now));
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current_at(Instant::now())
    }

    /// The live notice as of `now`, if it has not expired.
    pub fn current_at(&self, now: Instant) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|(_, posted)| now.saturating_duration_since(*posted) < self.lifetime)
            .map(|(notice, _)| notice)
    }

    /// The most recent notice regardless of expiry.
    pub fn last(&self) -> Option<&Notice> {
        self.current.as_ref().map(|(notice, _)| notice)
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
