//! Operator console state.
//!
//! `Console` is a single-threaded reducer: operator intents and timer ticks
//! queue [`Request`]s, and finished requests come back through
//! [`Console::apply`]. Every piece of derived state is keyed by the
//! [`SelectionContext`] current when its request was issued; results for any
//! other context, or superseded by a newer request, are dropped.

use std::time::{Duration, Instant};

use crate::model::{ConsoleConfig, GroupsListing, Mode};

mod check;
mod context;
mod deployment_gate;
mod diff_workflow;
mod dispatch;
mod drift;
mod notice;
mod poller;
mod request;
mod tree_panel;

pub use self::check::CheckRunner;
pub use self::context::{Delivery, Generation, Origin, SelectionContext, Ticket};
pub use self::deployment_gate::{DeploymentGate, GateState, PolicyViolation, UpdateStage};
pub use self::diff_workflow::DiffWorkflow;
pub use self::dispatch::{Dispatcher, execute};
pub use self::drift::DriftPanel;
pub use self::notice::{Notice, NoticeKind, Notices};
pub use self::poller::{DRIFT_POLL_INTERVAL, Scheduler, StatusPoller, Tick, clamp_refresh_interval};
pub use self::request::{Completion, Request};
pub use self::tree_panel::TreePanel;

/// Something the view may want to react to (e.g. open a result modal).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleEvent {
    GroupsLoaded,
    TreeUpdated,
    DiffUpdated,
    CheckReady,
    UpdateReady(UpdateStage),
    DriftUpdated,
}

#[derive(Debug)]
pub struct Console {
    groups: Option<GroupsListing>,
    mode: Mode,
    context: Option<SelectionContext>,
    config_dir_suffix: String,
    tree: TreePanel,
    diff: DiffWorkflow,
    check: CheckRunner,
    gate: DeploymentGate,
    drift: DriftPanel,
    poller: StatusPoller,
    notices: Notices,
    outbox: Vec<Request>,
    events: Vec<ConsoleEvent>,
}

impl Console {
    pub fn new(cfg: &ConsoleConfig, now: Instant) -> Self {
        let mut poller = StatusPoller::new(cfg.auto_refresh_interval());
        poller.set_auto_refresh(cfg.auto_refresh, now);
        Self {
            groups: None,
            mode: cfg.initial_mode,
            context: None,
            config_dir_suffix: String::new(),
            tree: TreePanel::new(cfg.show_all),
            diff: DiffWorkflow::default(),
            check: CheckRunner::default(),
            gate: DeploymentGate::default(),
            drift: DriftPanel::default(),
            poller,
            notices: Notices::default(),
            outbox: Vec::new(),
            events: Vec::new(),
        }
    }

    // --- intents -------------------------------------------------------

    pub fn load_groups(&mut self) {
        self.outbox.push(Request::Groups);
    }

    pub fn select_host(&mut self, group: &str, host: &str) {
        self.config_dir_suffix = self
            .groups
            .as_ref()
            .and_then(|g| g.find_host(group, host))
            .map(|h| h.config_dir_suffix.clone())
            .unwrap_or_default();
        self.switch_context(Some(SelectionContext::new(group, host, self.mode)));
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        let next = self.context.as_ref().map(|c| c.with_mode(mode));
        self.switch_context(next);
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggle());
    }

    pub fn set_show_all(&mut self, show_all: bool) {
        self.tree.set_show_all(show_all);
        if let Some(ctx) = self.context.clone() {
            let req = self.tree.request(&ctx, Origin::Operator);
            self.outbox.push(req);
        }
    }

    pub fn toggle_show_all(&mut self) {
        self.set_show_all(!self.tree.show_all());
    }

    pub fn toggle_directory(&mut self, key: &str) {
        self.tree.toggle_collapsed(key);
    }

    pub fn select_file(&mut self, path: &str) -> Result<(), PolicyViolation> {
        let Some(ctx) = self.context.clone() else {
            return self.refuse(PolicyViolation::NoHostSelected);
        };
        let req = self.diff.select_file(&ctx, path, Origin::Operator);
        self.outbox.push(req);
        Ok(())
    }

    /// Manual refresh of everything shown for the current context.
    pub fn refresh(&mut self) {
        match self.context.clone() {
            Some(ctx) => self.refresh_context(&ctx, Origin::Operator),
            None => self.load_groups(),
        }
    }

    pub fn run_check(&mut self) -> Result<(), PolicyViolation> {
        let Some(ctx) = self.context.clone() else {
            return self.refuse(PolicyViolation::NoHostSelected);
        };
        let req = self.check.run(&ctx);
        self.outbox.push(req);
        Ok(())
    }

    pub fn prepare_update(&mut self) -> Result<(), PolicyViolation> {
        match self.gate.prepare(self.context.as_ref()) {
            Ok(req) => {
                self.outbox.push(req);
                Ok(())
            }
            Err(violation) => self.refuse(violation),
        }
    }

    pub fn apply_update(&mut self) -> Result<(), PolicyViolation> {
        match self.gate.apply(self.context.as_ref()) {
            Ok(req) => {
                self.outbox.push(req);
                Ok(())
            }
            Err(violation) => self.refuse(violation),
        }
    }

    pub fn set_auto_refresh(&mut self, enabled: bool, now: Instant) {
        self.poller.set_auto_refresh(enabled, now);
        self.reissue_orphaned_fetches();
    }

    pub fn toggle_auto_refresh(&mut self, now: Instant) {
        let enabled = !self.poller.auto_refresh_enabled();
        self.set_auto_refresh(enabled, now);
    }

    pub fn set_auto_refresh_interval(&mut self, interval: Duration, now: Instant) {
        self.poller.set_auto_refresh_interval(interval, now);
        self.reissue_orphaned_fetches();
    }

    pub fn open_drift(&mut self, now: Instant) {
        self.drift.open();
        let epoch = self.poller.open_drift(now);
        let req = self.drift.request(epoch);
        self.outbox.push(req);
    }

    pub fn close_drift(&mut self) {
        self.poller.close_drift();
        self.drift.close();
    }

    pub fn refresh_drift(&mut self) {
        if self.drift.is_open() {
            let req = self.drift.request(self.poller.drift_epoch());
            self.outbox.push(req);
        }
    }

    /// Fires due timers.
    pub fn tick(&mut self, now: Instant) {
        for tick in self.poller.due(now) {
            match tick {
                Tick::AutoRefresh { epoch } => {
                    if let Some(ctx) = self.context.clone() {
                        tracing::debug!(%ctx, epoch, "auto-refresh tick");
                        self.refresh_context(&ctx, Origin::AutoRefresh { epoch });
                    }
                }
                Tick::Drift { epoch } => {
                    let req = self.drift.request(epoch);
                    self.outbox.push(req);
                }
            }
        }
    }

    // --- completions ---------------------------------------------------

    pub fn apply(&mut self, completion: Completion) {
        let label = completion.label();
        match completion {
            Completion::Groups { outcome } => match outcome {
                Ok(groups) => self.groups_loaded(groups),
                Err(err) => self.notify_error(NoticeKind::Transport, &err.context("load groups")),
            },
            Completion::Tree { ticket, outcome } => {
                let delivery = if self.poller.accepts(ticket.origin) {
                    self.tree.complete(&ticket, self.context.as_ref(), outcome)
                } else {
                    Delivery::Stale
                };
                self.settle(label, delivery, ConsoleEvent::TreeUpdated);
            }
            Completion::Diff {
                ticket,
                path,
                outcome,
            } => {
                let delivery = if self.poller.accepts(ticket.origin) {
                    self.diff
                        .complete(&ticket, &path, self.context.as_ref(), outcome)
                } else {
                    Delivery::Stale
                };
                self.settle(label, delivery, ConsoleEvent::DiffUpdated);
            }
            Completion::Check { ticket, outcome } => {
                let delivery = self.check.complete(&ticket, self.context.as_ref(), outcome);
                if self.settle(label, delivery, ConsoleEvent::CheckReady)
                    && let Some(result) = self.check.result()
                    && !result.ok
                {
                    self.notices
                        .push(NoticeKind::Application, "nginx check failed");
                }
            }
            Completion::Prepare { ticket, outcome } => {
                let delivery = self
                    .gate
                    .complete_prepare(&ticket, self.context.as_ref(), outcome);
                let nginx_failed = matches!(
                    self.gate.state(),
                    GateState::Prepared { ok: false, result } if !result.nginx_ok()
                );
                if self.settle(label, delivery, ConsoleEvent::UpdateReady(UpdateStage::Prepare))
                    && nginx_failed
                {
                    self.notices.push(
                        NoticeKind::Application,
                        "prepare: nginx check did not pass; apply is blocked",
                    );
                }
            }
            Completion::Apply { ticket, outcome } => {
                let delivery = self
                    .gate
                    .complete_apply(&ticket, self.context.as_ref(), outcome);
                if self.settle(label, delivery, ConsoleEvent::UpdateReady(UpdateStage::Apply)) {
                    match self.gate.state() {
                        GateState::Applied { result } if result.success => {
                            let msg = format!("update applied: {}", result.message);
                            self.notices.push(NoticeKind::Info, msg);
                        }
                        GateState::Applied { result } => {
                            let msg = format!("apply failed: {}", result.message);
                            self.notices.push(NoticeKind::Application, msg);
                        }
                        _ => {}
                    }
                }
            }
            Completion::Drift {
                epoch,
                generation,
                outcome,
            } => {
                let live = self.poller.accepts_drift(epoch);
                let delivery = self.drift.complete(generation, live, outcome);
                self.settle(label, delivery, ConsoleEvent::DriftUpdated);
            }
        }
    }

    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.outbox)
    }

    pub fn take_events(&mut self) -> Vec<ConsoleEvent> {
        std::mem::take(&mut self.events)
    }

    // --- accessors -----------------------------------------------------

    pub fn groups(&self) -> Option<&GroupsListing> {
        self.groups.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn context(&self) -> Option<&SelectionContext> {
        self.context.as_ref()
    }

    pub fn config_dir_suffix(&self) -> &str {
        &self.config_dir_suffix
    }

    pub fn tree(&self) -> &TreePanel {
        &self.tree
    }

    pub fn diff(&self) -> &DiffWorkflow {
        &self.diff
    }

    pub fn check(&self) -> &CheckRunner {
        &self.check
    }

    pub fn gate(&self) -> &DeploymentGate {
        &self.gate
    }

    pub fn drift(&self) -> &DriftPanel {
        &self.drift
    }

    pub fn poller(&self) -> &StatusPoller {
        &self.poller
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    // --- internals -----------------------------------------------------

    fn switch_context(&mut self, next: Option<SelectionContext>) {
        if self.context == next {
            return;
        }
        match &next {
            Some(ctx) => tracing::info!(%ctx, "context switched"),
            None => tracing::info!("context cleared"),
        }
        self.tree.clear();
        self.diff.clear();
        self.check.clear();
        self.gate.reset();
        self.context = next;
        if let Some(ctx) = self.context.clone() {
            let req = self.tree.request(&ctx, Origin::Operator);
            self.outbox.push(req);
        }
    }

    fn refresh_context(&mut self, ctx: &SelectionContext, origin: Origin) {
        let req = self.tree.request(ctx, origin);
        self.outbox.push(req);
        if let Some(req) = self.diff.refresh(ctx, origin) {
            self.outbox.push(req);
        }
    }

    /// A pending tree or diff fetch issued under an auto-refresh epoch that is
    /// no longer live would be dropped on arrival; fetch again as the operator.
    fn reissue_orphaned_fetches(&mut self) {
        let Some(ctx) = self.context.clone() else {
            return;
        };
        if let Some(origin) = self.tree.pending_origin()
            && !self.poller.accepts(origin)
        {
            tracing::debug!(%ctx, "re-issuing tree fetch orphaned by auto-refresh");
            let req = self.tree.request(&ctx, Origin::Operator);
            self.outbox.push(req);
        }
        if let Some(origin) = self.diff.pending_origin()
            && !self.poller.accepts(origin)
            && let Some(req) = self.diff.refresh(&ctx, Origin::Operator)
        {
            tracing::debug!(%ctx, "re-issuing diff fetch orphaned by auto-refresh");
            self.outbox.push(req);
        }
    }

    fn groups_loaded(&mut self, groups: GroupsListing) {
        let first = groups
            .first_host()
            .map(|(g, h)| (g.name.clone(), h.host.clone()));
        tracing::info!(groups = groups.groups.len(), "groups loaded");
        self.groups = Some(groups);
        self.events.push(ConsoleEvent::GroupsLoaded);
        let Some(ctx) = self.context.clone() else {
            match first {
                Some((group, host)) => self.select_host(&group, &host),
                None => self.notices.push(NoticeKind::Info, "no hosts configured"),
            }
            return;
        };
        let suffix = self
            .groups
            .as_ref()
            .and_then(|g| g.find_host(&ctx.group, &ctx.host))
            .map(|h| h.config_dir_suffix.clone());
        if let Some(suffix) = suffix {
            self.config_dir_suffix = suffix;
        }
    }

    /// Records the outcome of a completed request; true if its result is now visible.
    fn settle(&mut self, label: &str, delivery: Delivery, event: ConsoleEvent) -> bool {
        match delivery {
            Delivery::Applied => {
                self.events.push(event);
                true
            }
            Delivery::Stale => {
                tracing::debug!(request = label, "discarded stale result");
                false
            }
            Delivery::Rejected(err) => {
                self.notify_error(NoticeKind::Transport, &err);
                self.events.push(event);
                true
            }
            Delivery::Failed(err) => {
                self.notify_error(NoticeKind::Transport, &err);
                false
            }
        }
    }

    fn notify_error(&mut self, kind: NoticeKind, err: &anyhow::Error) {
        self.notices.push(kind, format!("{:#}", err));
    }

    fn refuse(&mut self, violation: PolicyViolation) -> Result<(), PolicyViolation> {
        self.notices.push(NoticeKind::Policy, violation.to_string());
        Err(violation)
    }
}

#[cfg(test)]
#[path = "tests/console/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/console/gate_tests.rs"]
mod gate_tests;

#[cfg(test)]
#[path = "tests/console/race_tests.rs"]
mod race_tests;

#[cfg(test)]
#[path = "tests/console/poller_tests.rs"]
mod poller_tests;
