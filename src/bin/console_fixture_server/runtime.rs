use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use clap::Parser;
use gitops_console::logging::{self, LogTarget};

use super::AppState;
use super::fixture::Fixture;
use super::handlers::{
    apply_update, check, fixture_hits, git_status, groups, healthz, prepare_update, tree,
    triple_diff,
};

#[derive(Parser)]
#[command(name = "console-fixture-server")]
#[command(about = "Fixture backend for gitops-console (development)", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Write bound address to this file (dev/test convenience)
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// JSON fixture describing groups, hosts and files; a built-in sample is used otherwise
    #[arg(long)]
    fixture: Option<PathBuf>,
}

pub(super) async fn run() -> Result<()> {
    let args = Args::parse();
    logging::init(LogTarget::Stderr, "info")?;

    let fixture = match &args.fixture {
        Some(path) => Fixture::load(path)?,
        None => Fixture::sample(),
    };
    tracing::info!(groups = fixture.groups.len(), "fixture loaded");
    let state = Arc::new(AppState::new(fixture));

    let api = Router::new()
        .route("/groups", get(groups))
        .route("/tree", get(tree))
        .route("/triple-diff", get(triple_diff))
        .route("/check", post(check))
        .route("/update/prepare", post(prepare_update))
        .route("/update/apply", post(apply_update))
        .route("/git/status", get(git_status))
        .route("/_fixture/hits", get(fixture_hits));
    let app = Router::new()
        .route("/healthz", get(healthz))
        .nest("/api/v1", api)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("bind {}", args.addr))?;

    let local_addr = listener.local_addr().context("read listener local addr")?;
    eprintln!("console-fixture-server listening on {}", local_addr);

    if let Some(addr_file) = &args.addr_file {
        std::fs::write(addr_file, local_addr.to_string())
            .with_context(|| format!("write addr file {}", addr_file.display()))?;
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
