use anyhow::{Context, Result};

use crate::model::Mode;

mod http_client;
mod operations;
mod types;

pub use self::types::*;

/// Blocking client for the console backend (`/api/v1`).
pub struct ApiClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("gitops-console/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Update endpoints always target production, whatever the operator is viewing.
pub const UPDATE_MODE: Mode = Mode::Prod;
