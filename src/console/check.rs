use anyhow::Result;

use crate::model::CheckResult;

use super::context::{Delivery, Generation, Origin, SelectionContext, Ticket};
use super::request::Request;

/// `nginx -t` style check for the current context.
#[derive(Debug, Default)]
pub struct CheckRunner {
    generation: Generation,
    running: bool,
    result: Option<(SelectionContext, CheckResult)>,
}

impl CheckRunner {
    pub fn run(&mut self, context: &SelectionContext) -> Request {
        let generation = self.generation.advance();
        self.running = true;
        Request::Check {
            ticket: Ticket {
                context: context.clone(),
                generation,
                origin: Origin::Operator,
            },
        }
    }

    pub fn complete(
        &mut self,
        ticket: &Ticket,
        current: Option<&SelectionContext>,
        outcome: Result<CheckResult>,
    ) -> Delivery {
        if !self.generation.is_current(ticket.generation) || current != Some(&ticket.context) {
            return Delivery::Stale;
        }
        self.running = false;
        match outcome {
            Ok(result) => {
                self.result = Some((ticket.context.clone(), result));
                Delivery::Applied
            }
            Err(err) => Delivery::Failed(err),
        }
    }

    pub fn clear(&mut self) {
        self.generation.advance();
        self.running = false;
        self.result = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn result(&self) -> Option<&CheckResult> {
        self.result.as_ref().map(|(_, r)| r)
    }

    pub fn result_context(&self) -> Option<&SelectionContext> {
        self.result.as_ref().map(|(c, _)| c)
    }
}
