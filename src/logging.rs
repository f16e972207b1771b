//! `tracing` subscriber setup.
//!
//! The terminal console owns stdout/stderr while running, so it logs to a
//! file or not at all. One-shot commands and the fixture server log to stderr.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_ENV: &str = "GITOPS_CONSOLE_LOG";

#[derive(Clone, Copy, Debug)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Off,
}

fn filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Installs the global subscriber. `default_directive` applies when
/// `$GITOPS_CONSOLE_LOG` is unset or invalid.
pub fn init(target: LogTarget<'_>, default_directive: &str) -> Result<()> {
    match target {
        LogTarget::Off => Ok(()),
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .with(filter(default_directive))
            .try_init()
            .context("install stderr logger"),
        LogTarget::File(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .with(filter(default_directive))
                .try_init()
                .context("install file logger")
        }
    }
}
