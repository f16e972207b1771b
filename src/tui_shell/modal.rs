use time::OffsetDateTime;

use crate::console::{CheckRunner, DeploymentGate, DriftPanel, GateState};
use crate::model::{NginxCheck, SyncStats, UpdateResult};

use super::style::{diff_lines, drift_style, ok_style};
use super::time_fmt::fmt_commit_ts;
use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum ModalKind {
    Check,
    Update,
    Drift,
}

#[derive(Clone, Debug)]
pub(super) struct Modal {
    pub(super) kind: ModalKind,
    pub(super) scroll: u16,
}

impl Modal {
    pub(super) fn new(kind: ModalKind) -> Self {
        Self { kind, scroll: 0 }
    }

    fn title(&self) -> &'static str {
        match self.kind {
            ModalKind::Check => "Check result",
            ModalKind::Update => "Production update",
            ModalKind::Drift => "Git status",
        }
    }

    fn hint(&self, app: &App) -> &'static str {
        match self.kind {
            ModalKind::Check => "Esc close",
            ModalKind::Update if app.console.gate().apply_enabled() => "y apply  Esc close",
            ModalKind::Update => "u prepare again  Esc close",
            ModalKind::Drift => "r refresh  Esc close (stops polling)",
        }
    }
}

pub(super) fn handle_modal_key(app: &mut App, key: KeyEvent) {
    let Some(kind) = app.modal.as_ref().map(|m| m.kind) else {
        return;
    };
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_modal(),
        KeyCode::Up | KeyCode::Char('k') => scroll(app, -1),
        KeyCode::Down | KeyCode::Char('j') => scroll(app, 1),
        KeyCode::PageUp => scroll(app, -10),
        KeyCode::PageDown => scroll(app, 10),
        KeyCode::Char('y') if kind == ModalKind::Update => app.apply_update(),
        KeyCode::Char('u') if kind == ModalKind::Update => app.prepare_update(),
        KeyCode::Char('r') if kind == ModalKind::Drift => app.console.refresh_drift(),
        _ => {}
    }
}

fn scroll(app: &mut App, delta: i32) {
    if let Some(modal) = app.modal.as_mut() {
        let next = i32::from(modal.scroll) + delta;
        modal.scroll = next.clamp(0, i32::from(u16::MAX)) as u16;
    }
}

pub(super) fn draw_modal(frame: &mut ratatui::Frame, app: &App, modal: &Modal) {
    let area = frame.area();
    let w = area.width.saturating_sub(6).clamp(20, 100);
    let h = area.height.saturating_sub(4).clamp(8, 30);
    let box_area = Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w,
        height: h,
    };
    frame.render_widget(ratatui::widgets::Clear, box_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(Span::styled(
            modal.title(),
            Style::default().fg(Color::Yellow),
        )))
        .title_bottom(Line::from(Span::styled(
            modal.hint(app),
            Style::default().fg(Color::Gray),
        )));
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    let lines = match modal.kind {
        ModalKind::Check => check_lines(app.console.check()),
        ModalKind::Update => update_lines(app.console.gate()),
        ModalKind::Drift => drift_lines(app.console.drift(), OffsetDateTime::now_utc()),
    };
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((modal.scroll, 0)),
        inner,
    );
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn verdict(label: &str, ok: bool) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("{}: ", label)),
        Span::styled(if ok { "passed" } else { "FAILED" }, ok_style(ok)),
    ])
}

pub(super) fn sync_lines(sync: &SyncStats) -> Vec<Line<'static>> {
    let mut lines = vec![
        heading("Sync"),
        Line::from(format!(
            "total {}  skipped {}  updated {}  added {}  deleted {}",
            sync.total, sync.skipped, sync.updated, sync.added, sync.deleted
        )),
    ];
    let lists = [
        ("~", &sync.updated_files, Color::Yellow),
        ("+", &sync.added_files, Color::Green),
        ("-", &sync.deleted_files, Color::Red),
    ];
    for (mark, files, color) in lists {
        for file in files.iter().flatten() {
            lines.push(Line::from(Span::styled(
                format!("  {} {}", mark, file),
                Style::default().fg(color),
            )));
        }
    }
    lines
}

pub(super) fn nginx_lines(nginx: &NginxCheck) -> Vec<Line<'static>> {
    let mut lines = vec![verdict("nginx", nginx.ok)];
    if !nginx.command.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("$ {}", nginx.command),
            Style::default().fg(Color::Gray),
        )));
    }
    lines.extend(nginx.output.lines().map(|l| Line::from(l.to_string())));
    lines
}

pub(super) fn check_lines(check: &CheckRunner) -> Vec<Line<'static>> {
    if check.is_running() {
        return vec![Line::from("running check...")];
    }
    let Some(result) = check.result() else {
        return vec![Line::from("no check result")];
    };
    let mut lines = Vec::new();
    if let Some(ctx) = check.result_context() {
        lines.push(Line::from(format!("{}", ctx)));
    }
    lines.push(verdict("check", result.ok));
    if let Some(mode) = result.mode {
        lines.push(Line::from(format!("mode: {}", mode.label())));
    }
    if let Some(sync) = &result.sync {
        lines.push(Line::default());
        lines.extend(sync_lines(sync));
    }
    if let Some(nginx) = &result.nginx {
        lines.push(Line::default());
        lines.extend(nginx_lines(nginx));
    }
    lines
}

pub(super) fn update_lines(gate: &DeploymentGate) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(target) = gate.target() {
        lines.push(Line::from(format!("target: {}/{} (production)", target.group, target.host)));
    }
    match gate.state() {
        GateState::Idle => lines.push(Line::from("no update prepared")),
        GateState::Preparing => lines.push(Line::from("preparing update (sync + nginx -t)...")),
        GateState::Applying { .. } => lines.push(Line::from("applying update...")),
        GateState::Failed { stage, message } => {
            lines.push(verdict(stage.as_str(), false));
            lines.push(Line::from(message.clone()));
        }
        GateState::Prepared { ok, .. } => {
            lines.push(verdict("prepare", *ok));
            lines.push(Line::from(Span::styled(
                if *ok {
                    "apply is enabled: press y to reload production"
                } else {
                    "apply is blocked until a prepare passes"
                },
                ok_style(*ok),
            )));
        }
        GateState::Applied { result } => {
            lines.push(verdict("apply", result.success));
            if !result.message.is_empty() {
                lines.push(Line::from(result.message.clone()));
            }
        }
    }
    match gate.latest() {
        Some(UpdateResult::Prepare(result)) => {
            if let Some(sync) = &result.sync {
                lines.push(Line::default());
                lines.extend(sync_lines(sync));
            }
            match &result.nginx {
                Some(nginx) => {
                    lines.push(Line::default());
                    lines.extend(nginx_lines(nginx));
                }
                None => lines.push(Line::from("nginx: no check reported")),
            }
        }
        Some(UpdateResult::Apply(result)) => {
            if let Some(nginx) = &result.nginx {
                lines.push(Line::default());
                lines.extend(nginx_lines(nginx));
            }
        }
        None => {}
    }
    lines
}

pub(super) fn drift_lines(panel: &DriftPanel, now: OffsetDateTime) -> Vec<Line<'static>> {
    let Some(status) = panel.status() else {
        return vec![Line::from(if panel.is_loading() {
            "loading git status..."
        } else {
            "no git status yet"
        })];
    };
    let mut lines = vec![
        Line::from(vec![
            Span::raw("status: "),
            Span::styled(status.status.label().to_string(), drift_style(status.status)),
            Span::raw(if panel.is_loading() { "  (refreshing)" } else { "" }),
        ]),
        Line::from(format!("branch: {}   sync mode: {}", status.branch, status.sync_mode)),
    ];
    for (label, commit) in [("local ", &status.local_commit), ("remote", &status.remote_commit)] {
        match commit {
            Some(c) => lines.push(Line::from(format!(
                "{} {}  {}  {}  {}",
                label,
                c.short_hash(),
                c.author,
                fmt_commit_ts(&c.timestamp, now),
                c.message.lines().next().unwrap_or_default()
            ))),
            None => lines.push(Line::from(format!("{} -", label))),
        }
    }
    if let Some(err) = &status.error {
        lines.push(Line::from(Span::styled(
            format!("error: {}", err),
            Style::default().fg(Color::Red),
        )));
    }
    if let Some(diff) = status.diff.as_deref().filter(|d| !d.is_empty()) {
        lines.push(Line::default());
        lines.extend(diff_lines(diff).into_iter().map(owned_line));
    }
    lines
}

fn owned_line(line: Line<'_>) -> Line<'static> {
    Line::from(
        line.spans
            .into_iter()
            .map(|s| Span::styled(s.content.into_owned(), s.style))
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
#[path = "../tests/tui_shell/modal_tests.rs"]
mod tests;
