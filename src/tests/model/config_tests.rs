use std::io::Write;
use std::time::Duration;

use super::*;

#[test]
fn partial_config_file_falls_back_to_defaults() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, r#"{{"api_base": "http://console.internal:9000/api/v1/"}}"#)?;

    let cfg = ConsoleConfig::load(Some(file.path()), None)?;
    assert_eq!(cfg.api_base, "http://console.internal:9000/api/v1");
    assert_eq!(cfg.auto_refresh_secs, DEFAULT_AUTO_REFRESH_SECS);
    assert!(cfg.show_all);
    assert!(!cfg.auto_refresh);
    assert_eq!(cfg.initial_mode, Mode::Preview);
    Ok(())
}

#[test]
fn auto_refresh_interval_is_clamped_to_three_seconds() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, r#"{{"auto_refresh_secs": 1, "initial_mode": "prod"}}"#)?;

    let cfg = ConsoleConfig::load(Some(file.path()), Some("http://override:1/api/v1"))?;
    assert_eq!(cfg.auto_refresh_secs, MIN_AUTO_REFRESH_SECS);
    assert_eq!(cfg.auto_refresh_interval(), Duration::from_secs(3));
    assert_eq!(cfg.initial_mode, Mode::Prod);
    assert_eq!(cfg.api_base, "http://override:1/api/v1");
    Ok(())
}

#[test]
fn unreadable_config_reports_path() {
    let err = ConsoleConfig::load(Some(std::path::Path::new("/nonexistent/console.json")), None)
        .expect_err("missing file must fail");
    assert!(format!("{:#}", err).contains("/nonexistent/console.json"));
}

#[test]
fn tree_listing_ignores_unknown_status_tags() -> anyhow::Result<()> {
    let listing: TreeListing = serde_json::from_str(
        r#"{"prefix":"conf","paths":["a.conf","b.conf"],
            "file_statuses":{"a.conf":"modified","b.conf":"renamed"}}"#,
    )?;
    let statuses = listing.statuses();
    assert_eq!(statuses.get("a.conf"), Some(&FileStatus::Modified));
    assert!(!statuses.contains_key("b.conf"));
    Ok(())
}

#[test]
fn prepare_verdict_comes_from_nginx_record_only() -> anyhow::Result<()> {
    let passing_flag_failing_check: PrepareResult = serde_json::from_str(
        r#"{"success":true,"nginx":{"command":"nginx -t","ok":false,"output":"emerg"}}"#,
    )?;
    assert!(!passing_flag_failing_check.nginx_ok());

    let no_record: PrepareResult = serde_json::from_str(r#"{"success":true}"#)?;
    assert!(!no_record.nginx_ok());
    Ok(())
}

#[test]
fn drift_state_tolerates_unknown_values() -> anyhow::Result<()> {
    let status: GitStatus = serde_json::from_str(
        r#"{"branch":"main","sync_mode":"pull","status":"rebasing"}"#,
    )?;
    assert_eq!(status.status, DriftState::Unknown);

    let commit = CommitInfo {
        hash: "0123456789abcdef".to_string(),
        message: String::new(),
        author: String::new(),
        timestamp: String::new(),
    };
    assert_eq!(commit.short_hash(), "0123456");
    Ok(())
}
