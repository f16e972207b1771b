use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

fn fmt_abs(dt: OffsetDateTime) -> Option<String> {
    dt.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]Z"
    ))
    .ok()
}

fn fmt_since(dt: OffsetDateTime, now: OffsetDateTime) -> Option<String> {
    let secs = (now - dt).whole_seconds();
    if secs < 0 {
        return None;
    }
    let mins = secs / 60;
    let hours = mins / 60;
    let s = if secs < 60 {
        "just now".to_string()
    } else if mins < 60 {
        format!("{}m ago", mins)
    } else if hours < 48 {
        format!("{}h ago", hours)
    } else {
        format!("{}d ago", hours / 24)
    };
    Some(s)
}

/// Commit timestamp as `2024-05-01 12:30Z (3h ago)`; unparseable input is shown verbatim.
pub(super) fn fmt_commit_ts(ts: &str, now: OffsetDateTime) -> String {
    let Ok(dt) = OffsetDateTime::parse(ts, &Rfc3339) else {
        return ts.to_string();
    };
    let dt = dt.to_offset(time::UtcOffset::UTC);
    match (fmt_abs(dt), fmt_since(dt, now)) {
        (Some(abs), Some(since)) => format!("{} ({})", abs, since),
        (Some(abs), None) => abs,
        _ => ts.to_string(),
    }
}

#[cfg(test)]
#[path = "../tests/tui_shell/time_fmt_tests.rs"]
mod tests;
