use std::fmt;

use crate::model::Mode;

/// The (group, host, mode) triple every piece of derived state is keyed by.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SelectionContext {
    pub group: String,
    pub host: String,
    pub mode: Mode,
}

impl SelectionContext {
    pub fn new(group: impl Into<String>, host: impl Into<String>, mode: Mode) -> Self {
        Self {
            group: group.into(),
            host: host.into(),
            mode,
        }
    }

    pub fn with_mode(&self, mode: Mode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }
}

impl fmt::Display for SelectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.group, self.host, self.mode)
    }
}

/// Who asked for a request. Auto-refresh requests die with the scheduler
/// epoch that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Operator,
    AutoRefresh { epoch: u64 },
}

/// Identity of one in-flight request: the context it was issued for and the
/// owning controller's generation at issue time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub context: SelectionContext,
    pub generation: u64,
    pub origin: Origin,
}

/// Monotonic request counter. Advancing it invalidates every earlier ticket.
#[derive(Clone, Copy, Debug, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn current(self) -> u64 {
        self.0
    }

    pub fn is_current(self, generation: u64) -> bool {
        self.0 == generation
    }
}

/// What happened to a completed request.
#[derive(Debug)]
pub enum Delivery {
    /// Result accepted and now visible.
    Applied,
    /// Superseded by a newer request or a context switch; dropped.
    Stale,
    /// Backend rejected the request but its diagnostic body was accepted and is visible.
    Rejected(anyhow::Error),
    /// Nothing usable came back; previous state is untouched.
    Failed(anyhow::Error),
}

impl Delivery {
    pub fn is_stale(&self) -> bool {
        matches!(self, Delivery::Stale)
    }
}
