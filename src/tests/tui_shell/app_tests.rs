use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::*;
use crate::console::{Completion, Request};
use crate::model::TreeListing;
use crate::tui_shell::event_loop::handle_key;

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn app_with_groups() -> App {
    let mut console = Console::new(&ConsoleConfig::default(), Instant::now());
    console.apply(Completion::Groups {
        outcome: Ok(serde_json::from_value(serde_json::json!({
            "groups": [
                {"name": "edge", "hosts": [
                    {"name": "Edge 1", "host": "edge-1", "config_dir_suffix": "edge/1"},
                    {"name": "Edge 2", "host": "edge-2", "config_dir_suffix": "edge/2"}
                ]}
            ]
        }))
        .unwrap()),
    });
    let mut app = App::new(console, None);
    app.pump(Instant::now());
    app
}

fn land_tree(app: &mut App, paths: &[&str], changed: &[&str]) {
    let req = app
        .console
        .take_requests()
        .into_iter()
        .rev()
        .find(|r| matches!(r, Request::Tree { .. }))
        .unwrap();
    let Request::Tree { ticket } = req else {
        unreachable!()
    };
    app.console.apply(Completion::Tree {
        ticket,
        outcome: Ok(TreeListing {
            prefix: String::new(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
            diff_paths: None,
            file_statuses: Some(
                changed
                    .iter()
                    .map(|p| (p.to_string(), "added".to_string()))
                    .collect(),
            ),
        }),
    });
    app.pump(Instant::now());
}

#[test]
fn host_rows_interleave_groups_and_hosts_and_cursor_follows_selection() {
    let app = app_with_groups();
    let rows = app.host_rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], HostRow::Group("edge".to_string()));
    assert_eq!(app.host_cursor, 1, "cursor on the auto-selected host");
}

#[test]
fn enter_on_host_switches_context() {
    let mut app = app_with_groups();
    app.console.take_requests();
    handle_key(&mut app, key(KeyCode::Down), Instant::now());
    handle_key(&mut app, key(KeyCode::Enter), Instant::now());
    assert_eq!(app.console.context().unwrap().host, "edge-2");
    assert_eq!(app.console.config_dir_suffix(), "edge/2");
    assert!(matches!(
        app.console.take_requests().as_slice(),
        [Request::Tree { .. }]
    ));
}

#[test]
fn enter_on_leaf_selects_file_and_on_directory_folds() {
    let mut app = app_with_groups();
    land_tree(&mut app, &["conf.d/site.conf", "nginx.conf"], &["conf.d/site.conf"]);
    app.focus = Focus::Tree;

    // Rows: conf.d, conf.d/site.conf, nginx.conf
    handle_key(&mut app, key(KeyCode::Char('j')), Instant::now());
    handle_key(&mut app, key(KeyCode::Enter), Instant::now());
    assert_eq!(app.console.diff().selected(), Some("conf.d/site.conf"));
    assert_eq!(app.focus, Focus::Diff);

    app.focus = Focus::Tree;
    app.tree_cursor = 0;
    handle_key(&mut app, key(KeyCode::Enter), Instant::now());
    assert_eq!(app.console.tree().rows().len(), 2, "directory collapsed");
}

#[test]
fn apply_key_without_passing_prepare_sends_nothing() {
    let mut app = app_with_groups();
    handle_key(&mut app, key(KeyCode::Char('m')), Instant::now());
    app.console.take_requests();

    handle_key(&mut app, key(KeyCode::Char('y')), Instant::now());
    assert!(app.console.take_requests().is_empty());
    assert_eq!(
        app.console.notices().latest().map(|n| n.kind),
        Some(NoticeKind::Policy)
    );
}

#[test]
fn update_key_opens_modal_only_when_prepare_is_sent() {
    let mut app = app_with_groups();
    handle_key(&mut app, key(KeyCode::Char('u')), Instant::now());
    assert!(app.modal.is_none(), "preview mode refuses prepare");

    handle_key(&mut app, key(KeyCode::Char('m')), Instant::now());
    app.console.take_requests();
    handle_key(&mut app, key(KeyCode::Char('u')), Instant::now());
    assert_eq!(app.modal.as_ref().map(|m| m.kind), Some(ModalKind::Update));
    assert!(matches!(
        app.console.take_requests().as_slice(),
        [Request::Prepare { .. }]
    ));
}

#[test]
fn closing_drift_modal_stops_polling() {
    let mut app = app_with_groups();
    let now = Instant::now();
    handle_key(&mut app, key(KeyCode::Char('g')), now);
    assert_eq!(app.modal.as_ref().map(|m| m.kind), Some(ModalKind::Drift));
    assert!(app.console.poller().drift_running());

    handle_key(&mut app, key(KeyCode::Esc), now);
    assert!(app.modal.is_none());
    assert!(!app.console.poller().drift_running());
    assert!(!app.console.drift().is_open());
}

#[test]
fn interval_keys_respect_the_minimum() {
    let mut app = app_with_groups();
    let now = Instant::now();
    for _ in 0..10 {
        handle_key(&mut app, key(KeyCode::Char('-')), now);
    }
    assert_eq!(app.console.poller().auto_refresh_interval(), Duration::from_secs(3));
    handle_key(&mut app, key(KeyCode::Char('+')), now);
    assert_eq!(app.console.poller().auto_refresh_interval(), Duration::from_secs(4));
}

#[test]
fn quit_key_sets_flag() {
    let mut app = app_with_groups();
    handle_key(&mut app, key(KeyCode::Char('q')), Instant::now());
    assert!(app.quit);
}
