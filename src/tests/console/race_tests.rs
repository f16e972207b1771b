use std::time::{Duration, Instant};

use super::*;
use crate::model::{DiffRecord, GitStatus, TreeListing};

use super::test_support::{console, only_request, ticket};

fn diff_for(path: &str, body: &str) -> DiffRecord {
    DiffRecord {
        path: path.to_string(),
        remote_content: String::new(),
        compare_content: body.to_string(),
        diff: format!("+{}", body),
        mode: Mode::Preview,
        compare_label: "preview".to_string(),
        file_status: Some("modified".to_string()),
    }
}

fn diff_completion(req: &Request, outcome: anyhow::Result<DiffRecord>) -> Completion {
    match req {
        Request::Diff { ticket, path } => Completion::Diff {
            ticket: ticket.clone(),
            path: path.clone(),
            outcome,
        },
        other => panic!("not a diff request: {:?}", other),
    }
}

fn listing(paths: &[&str], changed: &[&str]) -> TreeListing {
    TreeListing {
        prefix: String::new(),
        paths: paths.iter().map(|p| p.to_string()).collect(),
        diff_paths: None,
        file_statuses: Some(
            changed
                .iter()
                .map(|p| (p.to_string(), "modified".to_string()))
                .collect(),
        ),
    }
}

#[test]
fn groups_auto_select_first_host() {
    let console = console(Mode::Preview);
    let ctx = console.context().unwrap();
    assert_eq!((ctx.group.as_str(), ctx.host.as_str()), ("edge", "edge-1"));
    assert_eq!(console.config_dir_suffix(), "edge/1");
}

#[test]
fn groups_load_queues_the_first_tree_fetch() {
    let mut console = Console::new(&ConsoleConfig::default(), Instant::now());
    console.load_groups();
    assert_eq!(console.take_requests(), vec![Request::Groups]);

    console.apply(Completion::Groups {
        outcome: Ok(super::test_support::groups()),
    });
    let req = only_request(&mut console);
    assert!(matches!(req, Request::Tree { ref ticket } if ticket.context.host == "edge-1"));
}

#[test]
fn slower_response_for_earlier_file_loses() {
    let mut console = console(Mode::Preview);
    console.select_file("x.conf").unwrap();
    let slow_x = only_request(&mut console);
    console.select_file("y.conf").unwrap();
    let fast_y = only_request(&mut console);

    console.apply(diff_completion(&fast_y, Ok(diff_for("y.conf", "Y"))));
    console.apply(diff_completion(&slow_x, Ok(diff_for("x.conf", "X"))));

    assert_eq!(console.diff().selected(), Some("y.conf"));
    assert_eq!(console.diff().record().map(|r| r.path.as_str()), Some("y.conf"));
}

#[test]
fn reselecting_the_same_file_still_supersedes() {
    let mut console = console(Mode::Preview);
    console.select_file("x.conf").unwrap();
    let first = only_request(&mut console);
    console.select_file("x.conf").unwrap();
    let second = only_request(&mut console);

    console.apply(diff_completion(&second, Ok(diff_for("x.conf", "new"))));
    console.apply(diff_completion(&first, Ok(diff_for("x.conf", "old"))));

    assert_eq!(console.diff().record().map(|r| r.compare_content.as_str()), Some("new"));
}

#[test]
fn host_switch_discards_in_flight_diff() {
    let mut console = console(Mode::Preview);
    console.select_file("x.conf").unwrap();
    let req = only_request(&mut console);

    console.select_host("core", "core-1");
    assert_eq!(console.diff().selected(), None);
    console.apply(diff_completion(&req, Ok(diff_for("x.conf", "X"))));

    assert!(console.diff().record().is_none());
    assert!(!console.take_events().contains(&ConsoleEvent::DiffUpdated));
}

#[test]
fn mode_switch_discards_in_flight_tree() {
    let mut console = console(Mode::Preview);
    console.refresh();
    let req = console
        .take_requests()
        .into_iter()
        .find(|r| matches!(r, Request::Tree { .. }))
        .unwrap();

    console.toggle_mode();
    console.apply(Completion::Tree {
        ticket: ticket(&req),
        outcome: Ok(listing(&["a.conf"], &["a.conf"])),
    });

    assert!(console.tree().forest().is_empty());
    assert_eq!(console.context().unwrap().mode, Mode::Prod);
}

#[test]
fn failed_diff_keeps_last_good_record() {
    let mut console = console(Mode::Preview);
    console.select_file("x.conf").unwrap();
    let req = only_request(&mut console);
    console.apply(diff_completion(&req, Ok(diff_for("x.conf", "X"))));

    console.refresh();
    let refresh = console
        .take_requests()
        .into_iter()
        .find(|r| matches!(r, Request::Diff { .. }))
        .unwrap();
    console.apply(diff_completion(&refresh, Err(anyhow::anyhow!("timed out"))));

    assert_eq!(console.diff().record().map(|r| r.compare_content.as_str()), Some("X"));
    let notice = console.notices().latest().unwrap();
    assert_eq!(notice.kind, NoticeKind::Transport);
    assert!(notice.message.contains("x.conf"), "{}", notice.message);
}

#[test]
fn show_all_toggle_rebuilds_from_cached_listing() {
    let mut console = console(Mode::Preview);
    console.refresh();
    let req = only_request(&mut console);
    console.apply(Completion::Tree {
        ticket: ticket(&req),
        outcome: Ok(listing(&["a/b.conf", "a/c.conf", "d.conf"], &["a/b.conf"])),
    });
    assert_eq!(console.tree().forest().len(), 2);

    console.toggle_show_all();
    assert!(!console.tree().show_all());
    assert_eq!(console.tree().forest().len(), 1, "rebuilt before the refetch lands");
    assert!(matches!(only_request(&mut console), Request::Tree { .. }));
}

#[test]
fn auto_refresh_ticks_refresh_tree_and_selected_diff() {
    let start = Instant::now();
    let cfg = ConsoleConfig {
        auto_refresh: true,
        auto_refresh_secs: 3,
        ..ConsoleConfig::default()
    };
    let mut console = Console::new(&cfg, start);
    console.apply(Completion::Groups {
        outcome: Ok(super::test_support::groups()),
    });
    console.select_file("x.conf").unwrap();
    console.take_requests();

    console.tick(start + Duration::from_secs(2));
    assert!(console.take_requests().is_empty());

    console.tick(start + Duration::from_secs(3));
    let requests = console.take_requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| matches!(
        ticket(r).origin,
        Origin::AutoRefresh { .. }
    )));
}

#[test]
fn disabling_auto_refresh_drops_its_late_results() {
    let start = Instant::now();
    let cfg = ConsoleConfig {
        auto_refresh: true,
        ..ConsoleConfig::default()
    };
    let mut console = Console::new(&cfg, start);
    console.apply(Completion::Groups {
        outcome: Ok(super::test_support::groups()),
    });
    console.take_requests();

    console.tick(start + Duration::from_secs(60));
    let req = only_request(&mut console);
    console.set_auto_refresh(false, start + Duration::from_secs(61));
    let retry = only_request(&mut console);
    assert_eq!(ticket(&retry).origin, Origin::Operator);
    console.apply(Completion::Tree {
        ticket: ticket(&req),
        outcome: Ok(listing(&["a.conf"], &[])),
    });

    assert!(console.tree().listing().is_none());
    console.tick(start + Duration::from_secs(600));
    assert!(console.take_requests().is_empty());
}

#[test]
fn disabling_auto_refresh_mid_fetch_still_loads_the_tree() {
    let start = Instant::now();
    let cfg = ConsoleConfig {
        auto_refresh: true,
        ..ConsoleConfig::default()
    };
    let mut console = Console::new(&cfg, start);
    console.apply(Completion::Groups {
        outcome: Ok(super::test_support::groups()),
    });
    let operator = only_request(&mut console);

    console.tick(start + Duration::from_secs(60));
    let auto = only_request(&mut console);
    console.set_auto_refresh(false, start + Duration::from_secs(61));
    let retry = only_request(&mut console);

    for req in [&operator, &auto, &retry] {
        console.apply(Completion::Tree {
            ticket: ticket(req),
            outcome: Ok(listing(&["a.conf"], &[])),
        });
    }

    assert!(console.tree().listing().is_some());
    assert!(!console.tree().is_loading());
}

#[test]
fn interval_change_reissues_pending_auto_refresh_diff() {
    let start = Instant::now();
    let cfg = ConsoleConfig {
        auto_refresh: true,
        auto_refresh_secs: 3,
        ..ConsoleConfig::default()
    };
    let mut console = Console::new(&cfg, start);
    console.apply(Completion::Groups {
        outcome: Ok(super::test_support::groups()),
    });
    console.select_file("x.conf").unwrap();
    console.take_requests();

    console.tick(start + Duration::from_secs(3));
    assert_eq!(console.take_requests().len(), 2);
    console.set_auto_refresh_interval(Duration::from_secs(10), start + Duration::from_secs(4));

    let requests = console.take_requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| ticket(r).origin == Origin::Operator));
    let diff = requests
        .iter()
        .find(|r| matches!(r, Request::Diff { .. }))
        .unwrap();
    console.apply(diff_completion(diff, Ok(diff_for("x.conf", "listen 80;"))));
    assert_eq!(console.diff().record().map(|r| r.path.as_str()), Some("x.conf"));
}

#[test]
fn closed_drift_panel_ignores_late_status() {
    let now = Instant::now();
    let mut console = console(Mode::Preview);
    console.open_drift(now);
    let req = only_request(&mut console);
    let Request::Drift { epoch, generation } = req else {
        panic!("expected drift request");
    };

    console.close_drift();
    console.apply(Completion::Drift {
        epoch,
        generation,
        outcome: Ok(serde_json::from_value::<GitStatus>(serde_json::json!({
            "branch": "main", "sync_mode": "pull", "status": "synced"
        }))
        .unwrap()),
    });
    assert!(console.drift().status().is_none());

    console.tick(now + Duration::from_secs(30));
    assert!(console.take_requests().is_empty(), "no drift poll while closed");
}

#[test]
fn drift_panel_polls_every_ten_seconds_while_open() {
    let now = Instant::now();
    let mut console = console(Mode::Preview);
    console.open_drift(now);
    assert_eq!(console.take_requests().len(), 1, "immediate fetch on open");

    console.tick(now + Duration::from_secs(9));
    assert!(console.take_requests().is_empty());
    console.tick(now + Duration::from_secs(10));
    assert!(matches!(only_request(&mut console), Request::Drift { .. }));

    console.refresh_drift();
    let manual = only_request(&mut console);
    let Request::Drift { epoch, generation } = manual else {
        panic!("expected drift request");
    };
    console.apply(Completion::Drift {
        epoch,
        generation,
        outcome: Ok(serde_json::from_value::<GitStatus>(serde_json::json!({
            "branch": "main", "sync_mode": "push", "status": "diverged"
        }))
        .unwrap()),
    });
    assert!(console.drift().status().unwrap().status.is_alarming());
}
