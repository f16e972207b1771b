use crate::model::DriftState;

use super::*;

pub(super) fn marker_color(color: MarkerColor) -> Color {
    match color {
        MarkerColor::Yellow => Color::Yellow,
        MarkerColor::Green => Color::Green,
        MarkerColor::Red => Color::Red,
    }
}

pub(super) fn mode_style(mode: Mode) -> Style {
    match mode {
        Mode::Preview => Style::default().fg(Color::Black).bg(Color::Green),
        Mode::Prod => Style::default().fg(Color::White).bg(Color::Red),
    }
}

/// Unified-diff line coloring by leading marker.
pub(super) fn diff_line_style(line: &str) -> Style {
    if line.starts_with("+++") || line.starts_with("---") {
        Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)
    } else if line.starts_with("@@") {
        Style::default().fg(Color::Cyan)
    } else if line.starts_with('+') {
        Style::default().fg(Color::Green)
    } else if line.starts_with('-') {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    }
}

pub(super) fn diff_lines(diff: &str) -> Vec<Line<'_>> {
    diff.lines()
        .map(|l| Line::from(Span::styled(l, diff_line_style(l))))
        .collect()
}

pub(super) fn notice_style(kind: NoticeKind) -> Style {
    match kind {
        NoticeKind::Info => Style::default().fg(Color::Green),
        NoticeKind::Transport => Style::default().fg(Color::Red),
        NoticeKind::Application => Style::default().fg(Color::Yellow),
        NoticeKind::Policy => Style::default().fg(Color::Magenta),
    }
}

pub(super) fn drift_style(state: DriftState) -> Style {
    match state {
        DriftState::Synced => Style::default().fg(Color::Green),
        DriftState::Ahead | DriftState::Behind => Style::default().fg(Color::Yellow),
        DriftState::Diverged | DriftState::Error => {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        }
        DriftState::Unknown => Style::default().fg(Color::Gray),
    }
}

pub(super) fn ok_style(ok: bool) -> Style {
    if ok {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    }
}

pub(super) fn pane_block(title: Line<'_>, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

#[cfg(test)]
#[path = "../tests/tui_shell/style_tests.rs"]
mod tests;
