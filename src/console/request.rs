use anyhow::Result;

use crate::api::DiagnosticReply;
use crate::model::{
    ApplyResult, CheckResult, DiffRecord, GitStatus, GroupsListing, PrepareResult, TreeListing,
};

use super::context::Ticket;

/// A backend call the console wants made. Produced by intents and ticks,
/// executed by the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Groups,
    Tree { ticket: Ticket },
    Diff { ticket: Ticket, path: String },
    Check { ticket: Ticket },
    Prepare { ticket: Ticket },
    Apply { ticket: Ticket },
    Drift { epoch: u64, generation: u64 },
}

impl Request {
    pub fn label(&self) -> &'static str {
        match self {
            Request::Groups => "groups",
            Request::Tree { .. } => "tree",
            Request::Diff { .. } => "diff",
            Request::Check { .. } => "check",
            Request::Prepare { .. } => "prepare",
            Request::Apply { .. } => "apply",
            Request::Drift { .. } => "drift",
        }
    }
}

/// A finished request, carrying back the identity it was issued with.
#[derive(Debug)]
pub enum Completion {
    Groups {
        outcome: Result<GroupsListing>,
    },
    Tree {
        ticket: Ticket,
        outcome: Result<TreeListing>,
    },
    Diff {
        ticket: Ticket,
        path: String,
        outcome: Result<DiffRecord>,
    },
    Check {
        ticket: Ticket,
        outcome: Result<CheckResult>,
    },
    Prepare {
        ticket: Ticket,
        outcome: Result<DiagnosticReply<PrepareResult>>,
    },
    Apply {
        ticket: Ticket,
        outcome: Result<DiagnosticReply<ApplyResult>>,
    },
    Drift {
        epoch: u64,
        generation: u64,
        outcome: Result<GitStatus>,
    },
}

impl Completion {
    pub fn label(&self) -> &'static str {
        match self {
            Completion::Groups { .. } => "groups",
            Completion::Tree { .. } => "tree",
            Completion::Diff { .. } => "diff",
            Completion::Check { .. } => "check",
            Completion::Prepare { .. } => "prepare",
            Completion::Apply { .. } => "apply",
            Completion::Drift { .. } => "drift",
        }
    }
}
