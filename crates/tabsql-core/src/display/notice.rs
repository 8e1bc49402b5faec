//! Transient user-facing messages that expire after a few seconds.

use std::time::{Duration, Instant};

pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub created: Instant,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, text)
    }

    fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            created: Instant::now(),
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created) >= NOTICE_TTL
    }
}

/// Notices in arrival order.
#[derive(Debug, Default)]
pub struct Notices {
    items: Vec<Notice>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        match notice.kind {
            NoticeKind::Success => log::debug!("notice: {}", notice.text),
            NoticeKind::Error => log::debug!("error notice: {}", notice.text),
        }
        self.items.push(notice);
    }

    /// Drop expired notices and return the live ones.
    pub fn live(&mut self, now: Instant) -> &[Notice] {
        self.items.retain(|n| !n.is_expired_at(now));
        &self.items
    }

    /// Remove and return everything queued, expired or not.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.items)
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.items.last()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
