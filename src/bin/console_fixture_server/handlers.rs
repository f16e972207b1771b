use std::time::Duration;

use super::*;

#[derive(Debug, Deserialize)]
pub(super) struct TreeQuery {
    group: String,
    host: String,
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DiffQuery {
    group: String,
    host: String,
    path: String,
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ModeQuery {
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TargetBody {
    server: String,
    group: String,
}

fn parse_mode(raw: Option<&str>) -> std::result::Result<Mode, Response> {
    match raw {
        None => Ok(Mode::Preview),
        Some(raw) => raw.parse().map_err(bad_request),
    }
}

fn lookup<'a>(
    state: &'a AppState,
    group: &str,
    host: &str,
) -> std::result::Result<&'a FixtureHost, Response> {
    state
        .fixture
        .host(group, host)
        .ok_or_else(|| not_found(&format!("host {}/{}", group, host)))
}

fn nginx_check(host: &FixtureHost) -> NginxCheck {
    NginxCheck {
        command: "nginx -t -c /etc/nginx/nginx.conf".to_string(),
        ok: host.nginx_ok,
        output: host.nginx_output(),
    }
}

fn scripted_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn pause(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

pub(super) async fn healthz() -> &'static str {
    "ok"
}

pub(super) async fn groups(State(state): State<Arc<AppState>>) -> Response {
    state.record("groups").await;
    Json(state.fixture.listing()).into_response()
}

pub(super) async fn tree(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TreeQuery>,
) -> Response {
    state.record("tree").await;
    if let Err(resp) = parse_mode(q.mode.as_deref()) {
        return resp;
    }
    let host = match lookup(&state, &q.group, &q.host) {
        Ok(host) => host,
        Err(resp) => return resp,
    };

    let mut statuses = BTreeMap::new();
    for file in &host.files {
        if let Some(tag) = &file.status {
            statuses.insert(file.path.clone(), tag.clone());
        }
    }
    let listing = TreeListing {
        prefix: host.prefix.clone(),
        paths: host.files.iter().map(|f| f.path.clone()).collect(),
        diff_paths: Some(statuses.keys().cloned().collect()),
        file_statuses: Some(statuses),
    };
    tracing::debug!(group = %q.group, host = %q.host, files = listing.paths.len(), "tree");
    Json(listing).into_response()
}

pub(super) async fn triple_diff(
    State(state): State<Arc<AppState>>,
    Query(q): Query<DiffQuery>,
) -> Response {
    state.record("triple-diff").await;
    let mode = match parse_mode(q.mode.as_deref()) {
        Ok(mode) => mode,
        Err(resp) => return resp,
    };
    let host = match lookup(&state, &q.group, &q.host) {
        Ok(host) => host,
        Err(resp) => return resp,
    };
    let Some(file) = host.file(&q.path) else {
        return not_found(&format!("file {}", q.path));
    };

    pause(file.delay_ms).await;
    let compare = file.compare_content(mode);
    let record = DiffRecord {
        path: q.path.clone(),
        remote_content: file.remote.clone(),
        compare_content: compare.to_string(),
        diff: unified_diff(&file.remote, compare, mode.as_str()),
        mode,
        compare_label: mode.label().to_string(),
        file_status: file.status.clone(),
    };
    tracing::debug!(path = %q.path, delay_ms = file.delay_ms, "triple diff");
    Json(record).into_response()
}

pub(super) async fn check(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ModeQuery>,
    Json(body): Json<TargetBody>,
) -> Response {
    state.record("check").await;
    let mode = match parse_mode(q.mode.as_deref()) {
        Ok(mode) => mode,
        Err(resp) => return resp,
    };
    let host = match lookup(&state, &body.group, &body.server) {
        Ok(host) => host,
        Err(resp) => return resp,
    };

    let result = CheckResult {
        ok: host.nginx_ok,
        mode: Some(mode),
        sync: (mode == Mode::Preview).then(|| host.sync_stats()),
        nginx: Some(nginx_check(host)),
    };
    let status = if result.ok {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    tracing::info!(group = %body.group, host = %body.server, %mode, ok = result.ok, "check");
    (status, Json(result)).into_response()
}

pub(super) async fn prepare_update(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ModeQuery>,
    Json(body): Json<TargetBody>,
) -> Response {
    state.record("update/prepare").await;
    if let Err(resp) = require_prod(q.mode.as_deref()) {
        return resp;
    }
    let host = match lookup(&state, &body.group, &body.server) {
        Ok(host) => host,
        Err(resp) => return resp,
    };

    pause(host.prepare.delay_ms).await;
    let result = PrepareResult {
        success: Some(true),
        nginx: Some(nginx_check(host)),
        sync: Some(host.sync_stats()),
    };
    tracing::info!(
        group = %body.group,
        host = %body.server,
        nginx_ok = host.nginx_ok,
        status = host.prepare.status,
        "prepare update"
    );
    (scripted_status(host.prepare.status), Json(result)).into_response()
}

pub(super) async fn apply_update(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ModeQuery>,
    Json(body): Json<TargetBody>,
) -> Response {
    state.record("update/apply").await;
    if let Err(resp) = require_prod(q.mode.as_deref()) {
        return resp;
    }
    let host = match lookup(&state, &body.group, &body.server) {
        Ok(host) => host,
        Err(resp) => return resp,
    };

    pause(host.apply.delay_ms).await;
    let result = if host.nginx_ok {
        ApplyResult {
            success: true,
            message: format!("nginx reloaded on {}", body.server),
            nginx: Some(nginx_check(host)),
        }
    } else {
        ApplyResult {
            success: false,
            message: "nginx -t failed; configuration not reloaded".to_string(),
            nginx: Some(nginx_check(host)),
        }
    };
    let status = match (result.success, host.apply.status) {
        (false, 200) => StatusCode::UNPROCESSABLE_ENTITY,
        (_, status) => scripted_status(status),
    };
    tracing::info!(group = %body.group, host = %body.server, success = result.success, "apply update");
    (status, Json(result)).into_response()
}

fn require_prod(raw: Option<&str>) -> std::result::Result<(), Response> {
    match parse_mode(raw)? {
        Mode::Prod => Ok(()),
        Mode::Preview => Err(bad_request(anyhow::anyhow!(
            "updates are only accepted in prod mode"
        ))),
    }
}

pub(super) async fn git_status(State(state): State<Arc<AppState>>) -> Response {
    state.record("git/status").await;
    Json(state.fixture.git_status.clone()).into_response()
}

pub(super) async fn fixture_hits(State(state): State<Arc<AppState>>) -> Response {
    let hits = state.hits.read().await.clone();
    Json(hits).into_response()
}
