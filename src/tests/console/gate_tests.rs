use super::*;
use crate::api::DiagnosticReply;
use crate::model::{ApplyResult, NginxCheck, PrepareResult};

use super::test_support::{console, only_request, prepared, ticket};

fn complete_prepare(console: &mut Console, status: u16, body: Option<PrepareResult>) {
    let req = only_request(console);
    assert!(matches!(req, Request::Prepare { .. }), "{:?}", req);
    console.apply(Completion::Prepare {
        ticket: ticket(&req),
        outcome: Ok(DiagnosticReply { status, body }),
    });
}

#[test]
fn failing_nginx_check_blocks_apply_without_a_request() {
    let mut console = console(Mode::Prod);
    console.prepare_update().unwrap();
    complete_prepare(&mut console, 200, Some(prepared(false)));

    assert!(!console.gate().apply_enabled());
    assert!(matches!(
        console.gate().state(),
        GateState::Prepared { ok: false, .. }
    ));

    assert_eq!(console.apply_update(), Err(PolicyViolation::PrepareFailed));
    assert!(console.take_requests().is_empty());
    let notice = console.notices().latest().unwrap();
    assert_eq!(notice.kind, NoticeKind::Policy);
}

#[test]
fn passing_prepare_unlocks_exactly_one_apply() {
    let mut console = console(Mode::Prod);
    console.prepare_update().unwrap();
    complete_prepare(&mut console, 200, Some(prepared(true)));
    assert!(console.gate().apply_enabled());
    assert!(console.take_events().contains(&ConsoleEvent::UpdateReady(UpdateStage::Prepare)));

    console.apply_update().unwrap();
    let req = only_request(&mut console);
    assert!(matches!(req, Request::Apply { .. }));
    assert!(!console.gate().apply_enabled(), "apply disabled while in flight");
    assert_eq!(console.apply_update(), Err(PolicyViolation::UpdateInFlight));
    assert!(console.take_requests().is_empty());

    console.apply(Completion::Apply {
        ticket: ticket(&req),
        outcome: Ok(DiagnosticReply {
            status: 200,
            body: Some(ApplyResult {
                success: true,
                message: "reloaded".to_string(),
                nginx: None,
            }),
        }),
    });
    assert!(matches!(console.gate().state(), GateState::Applied { result } if result.success));
    assert_eq!(console.apply_update(), Err(PolicyViolation::NotPrepared));
    assert!(console.take_requests().is_empty());
}

#[test]
fn missing_nginx_record_counts_as_failed() {
    let mut console = console(Mode::Prod);
    console.prepare_update().unwrap();
    let body = PrepareResult {
        success: Some(true),
        nginx: None,
        sync: None,
    };
    complete_prepare(&mut console, 200, Some(body));
    assert!(!console.gate().apply_enabled());
}

#[test]
fn rejected_prepare_shows_body_but_never_unlocks_apply() {
    let mut console = console(Mode::Prod);
    console.prepare_update().unwrap();
    complete_prepare(&mut console, 500, Some(prepared(true)));

    match console.gate().latest() {
        Some(crate::model::UpdateResult::Prepare(result)) => {
            assert_eq!(result.sync.as_ref().map(|s| s.updated), Some(1));
        }
        other => panic!("expected prepare diagnostic, got {:?}", other),
    }
    assert!(!console.gate().apply_enabled());
    let notice = console.notices().latest().unwrap();
    assert_eq!(notice.kind, NoticeKind::Transport);
    assert!(notice.message.contains("500"), "{}", notice.message);
}

#[test]
fn server_error_with_passing_nginx_keeps_transport_notice_newest() {
    let mut console = console(Mode::Prod);
    console.prepare_update().unwrap();
    complete_prepare(&mut console, 500, Some(prepared(true)));

    assert!(matches!(
        console.gate().state(),
        GateState::Prepared { ok: false, .. }
    ));
    assert!(
        console
            .notices()
            .iter()
            .all(|n| n.kind != NoticeKind::Application),
        "nginx passed, so no nginx failure may be reported"
    );
    let notice = console.notices().latest().unwrap();
    assert_eq!(notice.kind, NoticeKind::Transport);
}

#[test]
fn passing_status_with_failing_nginx_reports_the_check() {
    let mut console = console(Mode::Prod);
    console.prepare_update().unwrap();
    complete_prepare(&mut console, 200, Some(prepared(false)));

    let notice = console.notices().latest().unwrap();
    assert_eq!(notice.kind, NoticeKind::Application);
    assert!(notice.message.contains("nginx check did not pass"), "{}", notice.message);
}

#[test]
fn prepare_without_body_fails_the_stage() {
    let mut console = console(Mode::Prod);
    console.prepare_update().unwrap();
    complete_prepare(&mut console, 502, None);

    assert!(matches!(
        console.gate().state(),
        GateState::Failed {
            stage: UpdateStage::Prepare,
            ..
        }
    ));
    assert!(console.gate().latest().is_none());
    assert_eq!(console.apply_update(), Err(PolicyViolation::NotPrepared));
}

#[test]
fn transport_error_on_apply_keeps_apply_disabled() {
    let mut console = console(Mode::Prod);
    console.prepare_update().unwrap();
    complete_prepare(&mut console, 200, Some(prepared(true)));
    console.apply_update().unwrap();
    let req = only_request(&mut console);

    console.apply(Completion::Apply {
        ticket: ticket(&req),
        outcome: Err(anyhow::anyhow!("connection reset")),
    });

    assert!(matches!(
        console.gate().state(),
        GateState::Failed {
            stage: UpdateStage::Apply,
            ..
        }
    ));
    assert!(!console.gate().apply_enabled());
    assert!(console.notices().latest().unwrap().message.contains("connection reset"));
}

#[test]
fn preview_mode_refuses_prepare_locally() {
    let mut console = console(Mode::Preview);
    assert_eq!(console.prepare_update(), Err(PolicyViolation::PreviewMode));
    assert!(console.take_requests().is_empty());
    assert_eq!(console.notices().latest().unwrap().kind, NoticeKind::Policy);
    assert!(matches!(console.gate().state(), GateState::Idle));
}

#[test]
fn prepare_while_preparing_is_refused() {
    let mut console = console(Mode::Prod);
    console.prepare_update().unwrap();
    console.take_requests();
    assert_eq!(console.prepare_update(), Err(PolicyViolation::UpdateInFlight));
    assert!(console.take_requests().is_empty());
}

#[test]
fn host_switch_orphans_an_in_flight_prepare() {
    let mut console = console(Mode::Prod);
    console.prepare_update().unwrap();
    let req = only_request(&mut console);

    console.select_host("core", "core-1");
    console.take_requests();
    console.apply(Completion::Prepare {
        ticket: ticket(&req),
        outcome: Ok(DiagnosticReply {
            status: 200,
            body: Some(prepared(true)),
        }),
    });

    assert!(matches!(console.gate().state(), GateState::Idle));
    assert!(!console.gate().apply_enabled());
    assert_eq!(console.apply_update(), Err(PolicyViolation::NotPrepared));
}

#[test]
fn mode_toggle_resets_a_prepared_gate() {
    let mut console = console(Mode::Prod);
    console.prepare_update().unwrap();
    complete_prepare(&mut console, 200, Some(prepared(true)));
    assert!(console.gate().apply_enabled());

    console.toggle_mode();
    console.toggle_mode();

    assert!(!console.gate().apply_enabled());
    assert_eq!(console.apply_update(), Err(PolicyViolation::NotPrepared));
}

#[test]
fn check_failure_is_shown_in_full() {
    let mut console = console(Mode::Preview);
    console.run_check().unwrap();
    let req = only_request(&mut console);
    console.apply(Completion::Check {
        ticket: ticket(&req),
        outcome: Ok(crate::model::CheckResult {
            ok: false,
            mode: Some(Mode::Preview),
            sync: None,
            nginx: Some(NginxCheck {
                command: "nginx -t".to_string(),
                ok: false,
                output: "emerg".to_string(),
            }),
        }),
    });

    assert!(console.take_events().contains(&ConsoleEvent::CheckReady));
    let result = console.check().result().unwrap();
    assert_eq!(result.nginx.as_ref().map(|n| n.output.as_str()), Some("emerg"));
    assert_eq!(console.notices().latest().unwrap().kind, NoticeKind::Application);
}

#[test]
fn check_from_previous_host_is_discarded() {
    let mut console = console(Mode::Preview);
    console.run_check().unwrap();
    let req = only_request(&mut console);
    console.select_host("edge", "edge-2");
    console.apply(Completion::Check {
        ticket: ticket(&req),
        outcome: Ok(crate::model::CheckResult {
            ok: true,
            mode: None,
            sync: None,
            nginx: None,
        }),
    });
    assert!(console.check().result().is_none());
    assert!(!console.take_events().contains(&ConsoleEvent::CheckReady));
}
