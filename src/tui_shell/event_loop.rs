use anyhow::Context;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use super::*;

pub(super) fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.pump(Instant::now());

        terminal
            .draw(|f| render::draw(f, app, Instant::now()))
            .context("draw")?;
        if app.quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(50)).context("poll")? {
            match event::read().context("read event")? {
                Event::Key(k) if k.kind == KeyEventKind::Press => {
                    handle_key(app, k, Instant::now())
                }
                _ => {}
            }
        }
    }
}

pub(super) fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if app.modal.is_some() {
        modal::handle_modal_key(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(false),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(true),
        KeyCode::PageUp => app.scroll_diff(-10),
        KeyCode::PageDown => app.scroll_diff(10),
        KeyCode::Enter => app.activate(),
        KeyCode::Char('m') => {
            app.console.toggle_mode();
            app.tree_cursor = 0;
            app.diff_scroll = 0;
        }
        KeyCode::Char('f') => app.console.toggle_show_all(),
        KeyCode::Char('r') => app.console.refresh(),
        KeyCode::Char('a') => app.console.toggle_auto_refresh(now),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_auto_refresh(false, now),
        KeyCode::Char('-') => app.change_auto_refresh(true, now),
        KeyCode::Char('c') => {
            let _ = app.console.run_check();
        }
        KeyCode::Char('u') => app.prepare_update(),
        KeyCode::Char('y') => app.apply_update(),
        KeyCode::Char('g') => app.open_drift(now),
        _ => {}
    }
}
