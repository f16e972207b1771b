use ratatui::widgets::{List, ListItem, ListState};

use crate::change_tree::{self, VisibleRow};
use crate::model::STATUS_MARKERS;

use super::style::{diff_lines, marker_color, mode_style, notice_style, pane_block};
use super::*;

const NOTICE_TTL: Duration = Duration::from_secs(5);

pub(super) fn draw(frame: &mut ratatui::Frame, app: &App, now: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(chunks[1]);
    let host_rows = app.host_rows();
    let hosts_height = (host_rows.len() as u16 + 2).clamp(3, 12);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(hosts_height), Constraint::Min(0)])
        .split(body[0]);
    draw_hosts(frame, app, &host_rows, left[0]);
    draw_tree(frame, app, left[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(body[1]);
    draw_diff(frame, app, right[0]);
    draw_contents(frame, app, right[1]);

    draw_status(frame, app, chunks[2], now);

    if let Some(modal) = &app.modal {
        modal::draw_modal(frame, app, modal);
    }
}

fn draw_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let console = &app.console;
    let poller = console.poller();
    let auto = if poller.auto_refresh_enabled() {
        Span::styled(
            format!("auto {}s", poller.auto_refresh_interval().as_secs()),
            Style::default().fg(Color::Green),
        )
    } else {
        Span::styled("auto off", Style::default().fg(Color::DarkGray))
    };
    let filter = if console.tree().show_all() {
        "all files"
    } else {
        "changed only"
    };
    let mut spans = vec![
        Span::styled(
            " GitOps Console ",
            Style::default().fg(Color::Black).bg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", console.mode().as_str().to_uppercase()),
            mode_style(console.mode()),
        ),
        Span::raw("  "),
        auto,
        Span::raw("  "),
        Span::styled(filter, Style::default().fg(Color::Gray)),
    ];
    let busy = app.in_flight();
    if busy > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} request(s) in flight", busy),
            Style::default().fg(Color::Yellow),
        ));
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn draw_hosts(frame: &mut ratatui::Frame, app: &App, rows: &[HostRow], area: Rect) {
    let current = app.console.context();
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| match row {
            HostRow::Group(name) => ListItem::new(Line::from(Span::styled(
                name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ))),
            HostRow::Host { group, host } => {
                let selected = current.is_some_and(|c| c.group == *group && c.host == host.host);
                let style = if selected {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::raw(if selected { "  ● " } else { "    " }),
                    Span::styled(host.name.clone(), style),
                    Span::styled(format!("  {}", host.host), Style::default().fg(Color::DarkGray)),
                ]))
            }
        })
        .collect();
    let title = if app.console.groups().is_none() {
        "Hosts (loading...)"
    } else {
        "Hosts"
    };
    let focused = app.focus == Focus::Hosts;
    let list = List::new(items)
        .block(pane_block(Line::from(title), focused))
        .highlight_style(highlight(focused));
    let mut state = ListState::default().with_selected(Some(app.host_cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn highlight(focused: bool) -> Style {
    if focused {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

pub(super) fn tree_row_line<'a>(row: &VisibleRow<'a>, selected: bool, collapsed: bool) -> Line<'a> {
    let node = row.node;
    let mut spans = vec![Span::raw("  ".repeat(row.depth))];
    if node.is_leaf() {
        match node.marker() {
            Some(marker) => spans.push(Span::styled(
                format!("{} ", marker.icon),
                Style::default().fg(marker_color(marker.color)),
            )),
            None => spans.push(Span::raw("  ")),
        }
    } else {
        spans.push(Span::raw(if collapsed { "▸ " } else { "▾ " }));
    }
    let mut style = Style::default();
    if !node.is_leaf() && node.changed {
        style = style.add_modifier(Modifier::BOLD);
    }
    if selected {
        style = style.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED);
    }
    spans.push(Span::styled(node.name.as_str(), style));
    Line::from(spans)
}

fn draw_tree(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let tree = app.console.tree();
    let focused = app.focus == Focus::Tree;
    let changed = change_tree::changed_leaf_count(tree.forest());
    let title = Line::from(vec![
        Span::raw("Files"),
        Span::styled(
            format!("  {} changed", changed),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(if tree.is_loading() { "  (loading...)" } else { "" }),
    ]);
    let block = pane_block(title, focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let selected = app.console.diff().selected();
    let rows = tree.rows();
    if rows.is_empty() {
        let msg = match (app.console.context(), tree.listing()) {
            (None, _) => "select a host",
            (Some(_), None) => "",
            (Some(_), Some(_)) if tree.show_all() => "no files",
            (Some(_), Some(_)) => "no changed files (f shows all)",
        };
        frame.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            parts[0],
        );
    } else {
        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| {
                let is_selected = selected == Some(row.node.key.as_str());
                ListItem::new(tree_row_line(row, is_selected, tree.is_collapsed(&row.node.key)))
            })
            .collect();
        let list = List::new(items).highlight_style(highlight(focused));
        let mut state = ListState::default().with_selected(Some(app.tree_cursor));
        frame.render_stateful_widget(list, parts[0], &mut state);
    }

    frame.render_widget(Paragraph::new(legend()), parts[1]);
}

pub(super) fn legend() -> Line<'static> {
    let mut spans = Vec::new();
    for (_, marker) in STATUS_MARKERS {
        spans.push(Span::styled(
            marker.icon,
            Style::default().fg(marker_color(marker.color)),
        ));
        spans.push(Span::styled(
            format!(" {}  ", marker.label),
            Style::default().fg(Color::Gray),
        ));
    }
    Line::from(spans)
}

fn draw_diff(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let diff = app.console.diff();
    let focused = app.focus == Focus::Diff;
    let mut title = vec![Span::raw("Diff")];
    if let Some(record) = diff.record() {
        title.push(Span::styled(
            format!("  remote vs {}", record.compare_label),
            Style::default().fg(Color::Gray),
        ));
        if let Some(marker) = record.status().map(|s| s.marker()) {
            title.push(Span::styled(
                format!("  {} {}", marker.icon, marker.label),
                Style::default().fg(marker_color(marker.color)),
            ));
        }
    }
    if let Some(path) = diff.selected() {
        title.push(Span::raw(format!("  {}", path)));
    }
    if diff.is_loading() {
        title.push(Span::raw("  (loading...)"));
    }

    let body = match diff.record() {
        Some(record) if record.diff.trim().is_empty() => {
            Paragraph::new("no differences").style(Style::default().fg(Color::DarkGray))
        }
        Some(record) => Paragraph::new(diff_lines(&record.diff)),
        None if diff.selected().is_some() => Paragraph::new(""),
        None => Paragraph::new("select a file").style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(
        body.block(pane_block(Line::from(title), focused))
            .scroll((app.diff_scroll, 0)),
        area,
    );
}

fn draw_contents(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let record = app.console.diff().record();
    let compare_title = record
        .map(|r| r.compare_label.clone())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| app.console.mode().label().to_string());
    let panes = [
        (compare_title, record.map(|r| r.compare_content.as_str())),
        ("remote (deployed)".to_string(), record.map(|r| r.remote_content.as_str())),
    ];
    for ((title, content), pane) in panes.into_iter().zip(halves.iter()) {
        frame.render_widget(
            Paragraph::new(content.unwrap_or_default())
                .block(pane_block(Line::from(title), false))
                .scroll((app.diff_scroll, 0)),
            *pane,
        );
    }
}

fn draw_status(frame: &mut ratatui::Frame, app: &App, area: Rect, now: Instant) {
    let console = &app.console;
    let context = match console.context() {
        Some(ctx) => {
            let suffix = console.config_dir_suffix();
            let suffix = if suffix.is_empty() { "-" } else { suffix };
            format!(
                "{} | {} | {} | {}",
                ctx.group,
                ctx.host,
                suffix,
                ctx.mode.label()
            )
        }
        None => "no host selected".to_string(),
    };
    let second = match console.notices().current(now, NOTICE_TTL) {
        Some(notice) => Line::from(Span::styled(notice.message.clone(), notice_style(notice.kind))),
        None => Line::from(Span::styled(
            "Tab focus  Enter select  m mode  f filter  r refresh  a auto  c check  u update  g git  q quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    let lines = vec![
        Line::from(Span::styled(context, Style::default().fg(Color::Gray))),
        second,
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
#[path = "../tests/tui_shell/render_tests.rs"]
mod tests;
