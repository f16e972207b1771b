use anyhow::Result;

use crate::model::DiffRecord;

use super::context::{Delivery, Generation, Origin, SelectionContext, Ticket};
use super::request::Request;

/// Selected file and its triple diff. Every fetch supersedes the previous
/// one; a response is kept only if it still matches the selection.
#[derive(Debug, Default)]
pub struct DiffWorkflow {
    generation: Generation,
    selected: Option<String>,
    record: Option<DiffRecord>,
    pending: Option<Origin>,
}

impl DiffWorkflow {
    pub fn select_file(&mut self, context: &SelectionContext, path: &str, origin: Origin) -> Request {
        if self.selected.as_deref() != Some(path) {
            self.record = None;
            self.selected = Some(path.to_string());
        }
        self.issue(context, path.to_string(), origin)
    }

    /// Re-fetches the selected file, if any.
    pub fn refresh(&mut self, context: &SelectionContext, origin: Origin) -> Option<Request> {
        let path = self.selected.clone()?;
        Some(self.issue(context, path, origin))
    }

    fn issue(&mut self, context: &SelectionContext, path: String, origin: Origin) -> Request {
        let generation = self.generation.advance();
        self.pending = Some(origin);
        tracing::debug!(%context, %path, generation, "diff requested");
        Request::Diff {
            ticket: Ticket {
                context: context.clone(),
                generation,
                origin,
            },
            path,
        }
    }

    pub fn complete(
        &mut self,
        ticket: &Ticket,
        path: &str,
        current: Option<&SelectionContext>,
        outcome: Result<DiffRecord>,
    ) -> Delivery {
        let matches = self.generation.is_current(ticket.generation)
            && current == Some(&ticket.context)
            && self.selected.as_deref() == Some(path);
        if !matches {
            tracing::debug!(%path, generation = ticket.generation, "stale diff discarded");
            return Delivery::Stale;
        }
        self.pending = None;
        match outcome {
            Ok(record) => {
                self.record = Some(record);
                Delivery::Applied
            }
            Err(err) => Delivery::Failed(err.context(format!("fetch diff for {}", path))),
        }
    }

    pub fn clear(&mut self) {
        self.generation.advance();
        self.selected = None;
        self.record = None;
        self.pending = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn record(&self) -> Option<&DiffRecord> {
        self.record.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_origin(&self) -> Option<Origin> {
        self.pending
    }
}
