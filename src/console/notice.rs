use std::collections::VecDeque;
use std::time::{Duration, Instant};

const KEEP_LAST: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    /// Request could not complete or the body was unreadable.
    Transport,
    /// Backend answered with a well-formed negative result.
    Application,
    /// Operation refused locally; no request was sent.
    Policy,
}

impl NoticeKind {
    pub fn is_failure(self) -> bool {
        !matches!(self, NoticeKind::Info)
    }
}

#[derive(Clone, Debug)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub at: Instant,
}

/// Transient operator notifications, newest last.
#[derive(Debug, Default)]
pub struct Notices {
    items: VecDeque<Notice>,
}

impl Notices {
    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            NoticeKind::Info => tracing::info!(%message, "notice"),
            _ => tracing::warn!(?kind, %message, "notice"),
        }
        if self.items.len() == KEEP_LAST {
            self.items.pop_front();
        }
        self.items.push_back(Notice {
            kind,
            message,
            at: Instant::now(),
        });
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.items.back()
    }

    /// Latest notice if it is younger than `ttl`.
    pub fn current(&self, now: Instant, ttl: Duration) -> Option<&Notice> {
        self.latest()
            .filter(|n| now.saturating_duration_since(n.at) < ttl)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
