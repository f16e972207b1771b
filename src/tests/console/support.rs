use std::time::Instant;

use crate::console::{Completion, Console, Request, Ticket};
use crate::model::{ConsoleConfig, GroupsListing, Mode, NginxCheck, PrepareResult, SyncStats};

pub(crate) fn groups() -> GroupsListing {
    serde_json::from_value(serde_json::json!({
        "groups": [
            {"name": "edge", "hosts": [
                {"name": "Edge 1", "host": "edge-1", "config_dir_suffix": "edge/1"},
                {"name": "Edge 2", "host": "edge-2", "config_dir_suffix": "edge/2"}
            ]},
            {"name": "core", "hosts": [
                {"name": "Core", "host": "core-1", "config_dir_suffix": "core"}
            ]}
        ]
    }))
    .unwrap()
}

/// Console with groups loaded and the first host auto-selected; outbox drained.
pub(crate) fn console(mode: Mode) -> Console {
    let cfg = ConsoleConfig {
        initial_mode: mode,
        ..ConsoleConfig::default()
    };
    let mut console = Console::new(&cfg, Instant::now());
    console.apply(Completion::Groups { outcome: Ok(groups()) });
    console.take_requests();
    console.take_events();
    console
}

pub(crate) fn only_request(console: &mut Console) -> Request {
    let mut requests = console.take_requests();
    assert_eq!(requests.len(), 1, "expected one request, got {:?}", requests);
    requests.remove(0)
}

pub(crate) fn ticket(request: &Request) -> Ticket {
    match request {
        Request::Tree { ticket }
        | Request::Diff { ticket, .. }
        | Request::Check { ticket }
        | Request::Prepare { ticket }
        | Request::Apply { ticket } => ticket.clone(),
        other => panic!("request {:?} carries no ticket", other),
    }
}

pub(crate) fn prepared(nginx_ok: bool) -> PrepareResult {
    PrepareResult {
        success: Some(true),
        nginx: Some(NginxCheck {
            command: "nginx -t".to_string(),
            ok: nginx_ok,
            output: if nginx_ok {
                "syntax is ok".to_string()
            } else {
                "emerg: unknown directive".to_string()
            },
        }),
        sync: Some(SyncStats {
            total: 4,
            updated: 1,
            updated_files: Some(vec!["nginx.conf".to_string()]),
            ..SyncStats::default()
        }),
    }
}
