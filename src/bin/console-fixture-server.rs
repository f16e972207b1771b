//! Scriptable stand-in for the console backend, used for local development
//! and the end-to-end tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tokio::sync::RwLock;

use gitops_console::model::{
    ApplyResult, CheckResult, DiffRecord, Mode, NginxCheck, PrepareResult, TreeListing,
};

#[path = "console_fixture_server/fixture.rs"]
mod fixture;
use self::fixture::*;
#[path = "console_fixture_server/http_error.rs"]
mod http_error;
use self::http_error::*;
#[path = "console_fixture_server/handlers.rs"]
mod handlers;
#[path = "console_fixture_server/runtime.rs"]
mod runtime;

struct AppState {
    fixture: Fixture,

    // Requests served, keyed by route name; exposed for tests.
    hits: RwLock<BTreeMap<String, u64>>,
}

impl AppState {
    fn new(fixture: Fixture) -> Self {
        Self {
            fixture,
            hits: RwLock::new(BTreeMap::new()),
        }
    }

    async fn record(&self, route: &str) {
        let mut hits = self.hits.write().await;
        *hits.entry(route.to_string()).or_default() += 1;
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = runtime::run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
