use crate::model::HostSummary;

use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Focus {
    Hosts,
    Tree,
    Diff,
}

impl Focus {
    pub(super) fn next(self) -> Self {
        match self {
            Focus::Hosts => Focus::Tree,
            Focus::Tree => Focus::Diff,
            Focus::Diff => Focus::Hosts,
        }
    }
}

/// One line of the host list: a group heading or a selectable host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum HostRow {
    Group(String),
    Host { group: String, host: HostSummary },
}

const AUTO_REFRESH_STEP: Duration = Duration::from_secs(1);

pub(super) struct App {
    pub(super) console: Console,
    dispatcher: Option<Dispatcher>,
    pub(super) focus: Focus,
    pub(super) host_cursor: usize,
    pub(super) tree_cursor: usize,
    pub(super) diff_scroll: u16,
    pub(super) modal: Option<Modal>,
    pub(super) quit: bool,
}

impl App {
    /// Without a dispatcher, queued requests stay in the console outbox.
    pub(super) fn new(console: Console, dispatcher: Option<Dispatcher>) -> Self {
        Self {
            console,
            dispatcher,
            focus: Focus::Hosts,
            host_cursor: 0,
            tree_cursor: 0,
            diff_scroll: 0,
            modal: None,
            quit: false,
        }
    }

    /// One event-loop turn: land finished requests, fire timers, send new requests.
    pub(super) fn pump(&mut self, now: Instant) {
        if let Some(dispatcher) = self.dispatcher.as_mut() {
            for done in dispatcher.drain() {
                self.console.apply(done);
            }
        }
        self.console.tick(now);
        self.react();
        if let Some(dispatcher) = self.dispatcher.as_mut() {
            dispatcher.submit_all(self.console.take_requests());
        }
    }

    pub(super) fn in_flight(&self) -> usize {
        self.dispatcher.as_ref().map_or(0, Dispatcher::in_flight)
    }

    fn react(&mut self) {
        for event in self.console.take_events() {
            match event {
                ConsoleEvent::GroupsLoaded => self.sync_host_cursor(),
                ConsoleEvent::TreeUpdated => {
                    let rows = self.console.tree().rows().len();
                    self.tree_cursor = self.tree_cursor.min(rows.saturating_sub(1));
                }
                ConsoleEvent::CheckReady => self.open_modal(ModalKind::Check),
                ConsoleEvent::UpdateReady(_) => self.open_modal(ModalKind::Update),
                ConsoleEvent::DiffUpdated | ConsoleEvent::DriftUpdated => {}
            }
        }
    }

    fn open_modal(&mut self, kind: ModalKind) {
        // The drift panel stays on top; results wait behind it.
        let keep = matches!(&self.modal, Some(m) if m.kind == kind || m.kind == ModalKind::Drift);
        if !keep {
            self.modal = Some(Modal::new(kind));
        }
    }

    pub(super) fn close_modal(&mut self) {
        if let Some(modal) = self.modal.take()
            && modal.kind == ModalKind::Drift
        {
            self.console.close_drift();
        }
    }

    pub(super) fn host_rows(&self) -> Vec<HostRow> {
        let Some(groups) = self.console.groups() else {
            return Vec::new();
        };
        let mut rows = Vec::new();
        for group in &groups.groups {
            rows.push(HostRow::Group(group.name.clone()));
            for host in &group.hosts {
                rows.push(HostRow::Host {
                    group: group.name.clone(),
                    host: host.clone(),
                });
            }
        }
        rows
    }

    fn sync_host_cursor(&mut self) {
        let Some(ctx) = self.console.context() else {
            return;
        };
        let found = self.host_rows().iter().position(|row| {
            matches!(row, HostRow::Host { group, host } if *group == ctx.group && host.host == ctx.host)
        });
        if let Some(idx) = found {
            self.host_cursor = idx;
        }
    }

    pub(super) fn move_cursor(&mut self, down: bool) {
        match self.focus {
            Focus::Hosts => {
                let n = self.host_rows().len();
                self.host_cursor = step(self.host_cursor, n, down);
            }
            Focus::Tree => {
                let n = self.console.tree().rows().len();
                self.tree_cursor = step(self.tree_cursor, n, down);
            }
            Focus::Diff => self.scroll_diff(if down { 1 } else { -1 }),
        }
    }

    pub(super) fn scroll_diff(&mut self, delta: i32) {
        let next = i32::from(self.diff_scroll) + delta;
        self.diff_scroll = next.clamp(0, i32::from(u16::MAX)) as u16;
    }

    /// Enter: select a host, select a file, or fold a directory.
    pub(super) fn activate(&mut self) {
        match self.focus {
            Focus::Hosts => {
                let rows = self.host_rows();
                if let Some(HostRow::Host { group, host }) = rows.get(self.host_cursor) {
                    self.console.select_host(group, &host.host);
                    self.tree_cursor = 0;
                    self.diff_scroll = 0;
                }
            }
            Focus::Tree => {
                let target = self
                    .console
                    .tree()
                    .rows()
                    .get(self.tree_cursor)
                    .map(|row| (row.node.key.clone(), row.node.is_leaf()));
                match target {
                    Some((key, true)) => {
                        if self.console.select_file(&key).is_ok() {
                            self.diff_scroll = 0;
                            self.focus = Focus::Diff;
                        }
                    }
                    Some((key, false)) => self.console.toggle_directory(&key),
                    None => {}
                }
            }
            Focus::Diff => {}
        }
    }

    pub(super) fn prepare_update(&mut self) {
        if self.console.prepare_update().is_ok() {
            self.modal = Some(Modal::new(ModalKind::Update));
        }
    }

    pub(super) fn apply_update(&mut self) {
        // Refusals become policy notices inside the console.
        let _ = self.console.apply_update();
    }

    pub(super) fn open_drift(&mut self, now: Instant) {
        if self.console.drift().is_open() {
            return;
        }
        self.console.open_drift(now);
        self.modal = Some(Modal::new(ModalKind::Drift));
    }

    pub(super) fn change_auto_refresh(&mut self, faster: bool, now: Instant) {
        let current = self.console.poller().auto_refresh_interval();
        let next = if faster {
            current.saturating_sub(AUTO_REFRESH_STEP)
        } else {
            current + AUTO_REFRESH_STEP
        };
        self.console.set_auto_refresh_interval(next, now);
    }
}

fn step(cursor: usize, len: usize, down: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if down {
        (cursor + 1).min(len - 1)
    } else {
        cursor.saturating_sub(1)
    }
}

#[cfg(test)]
#[path = "../tests/tui_shell/app_tests.rs"]
mod tests;
