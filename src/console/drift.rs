use anyhow::Result;

use crate::model::GitStatus;

use super::context::{Delivery, Generation};
use super::request::Request;

/// Repository drift panel. Results are valid only for the poller epoch that
/// was current when the panel was opened.
#[derive(Debug, Default)]
pub struct DriftPanel {
    generation: Generation,
    open: bool,
    loading: bool,
    status: Option<GitStatus>,
}

impl DriftPanel {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.loading = false;
        self.generation.advance();
    }

    pub fn request(&mut self, epoch: u64) -> Request {
        self.loading = true;
        Request::Drift {
            epoch,
            generation: self.generation.advance(),
        }
    }

    /// `epoch_live` is the poller's verdict on the request's epoch.
    pub fn complete(&mut self, generation: u64, epoch_live: bool, outcome: Result<GitStatus>) -> Delivery {
        if !self.open || !epoch_live || !self.generation.is_current(generation) {
            return Delivery::Stale;
        }
        self.loading = false;
        match outcome {
            Ok(status) => {
                self.status = Some(status);
                Delivery::Applied
            }
            Err(err) => Delivery::Failed(err.context("fetch git status")),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn status(&self) -> Option<&GitStatus> {
        self.status.as_ref()
    }
}
