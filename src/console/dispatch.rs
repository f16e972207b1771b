use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::api::ApiClient;

use super::request::{Completion, Request};

/// Runs blocking backend calls on short-lived worker threads. Completions
/// come back over a channel in whatever order the backend answers.
pub struct Dispatcher {
    client: Arc<ApiClient>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    in_flight: usize,
}

impl Dispatcher {
    pub fn new(client: ApiClient) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            client: Arc::new(client),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn submit(&mut self, request: Request) {
        tracing::debug!(request = request.label(), "dispatch");
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.in_flight += 1;
        thread::spawn(move || {
            let completion = execute(&client, request);
            // Receiver gone means the console is shutting down.
            let _ = tx.send(completion);
        });
    }

    pub fn submit_all(&mut self, requests: impl IntoIterator<Item = Request>) {
        for request in requests {
            self.submit(request);
        }
    }

    /// Completions that have already arrived; never blocks.
    pub fn drain(&mut self) -> Vec<Completion> {
        let done: Vec<Completion> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(done.len());
        done
    }

    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<Completion> {
        match self.rx.recv_timeout(timeout) {
            Ok(done) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(done)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

/// Performs one request synchronously.
pub fn execute(client: &ApiClient, request: Request) -> Completion {
    match request {
        Request::Groups => Completion::Groups {
            outcome: client.list_groups(),
        },
        Request::Tree { ticket } => {
            let ctx = &ticket.context;
            let outcome = client.fetch_tree(&ctx.group, &ctx.host, ctx.mode);
            Completion::Tree { ticket, outcome }
        }
        Request::Diff { ticket, path } => {
            let ctx = &ticket.context;
            let outcome = client.triple_diff(&ctx.group, &ctx.host, &path, ctx.mode);
            Completion::Diff {
                ticket,
                path,
                outcome,
            }
        }
        Request::Check { ticket } => {
            let ctx = &ticket.context;
            let outcome = client.run_check(&ctx.group, &ctx.host, ctx.mode);
            Completion::Check { ticket, outcome }
        }
        Request::Prepare { ticket } => {
            let outcome = client.prepare_update(&ticket.context.group, &ticket.context.host);
            Completion::Prepare { ticket, outcome }
        }
        Request::Apply { ticket } => {
            let outcome = client.apply_update(&ticket.context.group, &ticket.context.host);
            Completion::Apply { ticket, outcome }
        }
        Request::Drift { epoch, generation } => Completion::Drift {
            epoch,
            generation,
            outcome: client.git_status(),
        },
    }
}
