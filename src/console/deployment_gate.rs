//! Two-phase production update: prepare (sync + nginx test), then apply.
//!
//! Apply is only reachable from a prepare whose nginx check passed. Every
//! refusal happens here, before a request is built, so a refused apply never
//! touches the network.

use std::fmt;

use anyhow::Result;

use crate::api::DiagnosticReply;
use crate::model::{ApplyResult, Mode, PrepareResult, UpdateResult};

use super::context::{Delivery, Generation, Origin, SelectionContext, Ticket};
use super::request::Request;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateStage {
    Prepare,
    Apply,
}

impl UpdateStage {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateStage::Prepare => "prepare",
            UpdateStage::Apply => "apply",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Preparing,
    Prepared { result: PrepareResult, ok: bool },
    Applying { prepared: PrepareResult },
    Applied { result: ApplyResult },
    /// The stage failed without a readable diagnostic.
    Failed { stage: UpdateStage, message: String },
}

/// An operation refused locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyViolation {
    NoHostSelected,
    PreviewMode,
    UpdateInFlight,
    NotPrepared,
    PrepareFailed,
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PolicyViolation::NoHostSelected => "select a host first",
            PolicyViolation::PreviewMode => "update only allowed in production mode",
            PolicyViolation::UpdateInFlight => "an update request is already in flight",
            PolicyViolation::NotPrepared => "apply requires a prepared update",
            PolicyViolation::PrepareFailed => "apply blocked: nginx check did not pass",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for PolicyViolation {}

#[derive(Debug)]
pub struct DeploymentGate {
    generation: Generation,
    state: GateState,
    target: Option<SelectionContext>,
}

impl Default for DeploymentGate {
    fn default() -> Self {
        Self {
            generation: Generation::default(),
            state: GateState::Idle,
            target: None,
        }
    }
}

impl DeploymentGate {
    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn target(&self) -> Option<&SelectionContext> {
        self.target.as_ref()
    }

    pub fn in_flight(&self) -> bool {
        matches!(self.state, GateState::Preparing | GateState::Applying { .. })
    }

    pub fn apply_enabled(&self) -> bool {
        matches!(self.state, GateState::Prepared { ok: true, .. })
    }

    /// Result to show the operator for the most recent stage.
    pub fn latest(&self) -> Option<UpdateResult> {
        match &self.state {
            GateState::Prepared { result, .. } => Some(UpdateResult::Prepare(result.clone())),
            GateState::Applying { prepared } => Some(UpdateResult::Prepare(prepared.clone())),
            GateState::Applied { result } => Some(UpdateResult::Apply(result.clone())),
            _ => None,
        }
    }

    pub fn prepare(&mut self, context: Option<&SelectionContext>) -> Result<Request, PolicyViolation> {
        let context = context.ok_or(PolicyViolation::NoHostSelected)?;
        if context.mode != Mode::Prod {
            return Err(PolicyViolation::PreviewMode);
        }
        if self.in_flight() {
            return Err(PolicyViolation::UpdateInFlight);
        }
        let generation = self.generation.advance();
        self.target = Some(context.clone());
        self.state = GateState::Preparing;
        tracing::info!(%context, generation, "update prepare started");
        Ok(Request::Prepare {
            ticket: Ticket {
                context: context.clone(),
                generation,
                origin: Origin::Operator,
            },
        })
    }

    pub fn apply(&mut self, context: Option<&SelectionContext>) -> Result<Request, PolicyViolation> {
        let context = context.ok_or(PolicyViolation::NoHostSelected)?;
        let prepared = match &self.state {
            GateState::Preparing | GateState::Applying { .. } => {
                return Err(PolicyViolation::UpdateInFlight);
            }
            GateState::Prepared { ok: false, .. } => return Err(PolicyViolation::PrepareFailed),
            GateState::Prepared { result, ok: true } => result.clone(),
            _ => return Err(PolicyViolation::NotPrepared),
        };
        if self.target.as_ref() != Some(context) {
            return Err(PolicyViolation::NotPrepared);
        }
        let generation = self.generation.advance();
        self.state = GateState::Applying { prepared };
        tracing::info!(%context, generation, "update apply started");
        Ok(Request::Apply {
            ticket: Ticket {
                context: context.clone(),
                generation,
                origin: Origin::Operator,
            },
        })
    }

    fn accepts(&self, ticket: &Ticket, current: Option<&SelectionContext>) -> bool {
        self.generation.is_current(ticket.generation)
            && current == Some(&ticket.context)
            && self.target.as_ref() == Some(&ticket.context)
    }

    pub fn complete_prepare(
        &mut self,
        ticket: &Ticket,
        current: Option<&SelectionContext>,
        outcome: Result<DiagnosticReply<PrepareResult>>,
    ) -> Delivery {
        if !self.accepts(ticket, current) || self.state != GateState::Preparing {
            tracing::debug!(generation = ticket.generation, "stale prepare discarded");
            return Delivery::Stale;
        }
        match outcome {
            Ok(DiagnosticReply {
                status,
                body: Some(result),
            }) => {
                let success = (200..300).contains(&status);
                // A rejected prepare never unlocks apply, whatever its body says.
                let ok = success && result.nginx_ok();
                tracing::info!(status, ok, "update prepared");
                self.state = GateState::Prepared { result, ok };
                if success {
                    Delivery::Applied
                } else {
                    Delivery::Rejected(anyhow::anyhow!("prepare update failed: HTTP {}", status))
                }
            }
            Ok(DiagnosticReply { status, body: None }) => {
                self.fail(UpdateStage::Prepare, anyhow::anyhow!("prepare update failed: HTTP {}", status))
            }
            Err(err) => self.fail(UpdateStage::Prepare, err),
        }
    }

    pub fn complete_apply(
        &mut self,
        ticket: &Ticket,
        current: Option<&SelectionContext>,
        outcome: Result<DiagnosticReply<ApplyResult>>,
    ) -> Delivery {
        if !self.accepts(ticket, current) || !matches!(self.state, GateState::Applying { .. }) {
            tracing::debug!(generation = ticket.generation, "stale apply discarded");
            return Delivery::Stale;
        }
        match outcome {
            Ok(DiagnosticReply {
                status,
                body: Some(result),
            }) => {
                tracing::info!(status, success = result.success, "update applied");
                self.state = GateState::Applied { result };
                if (200..300).contains(&status) {
                    Delivery::Applied
                } else {
                    Delivery::Rejected(anyhow::anyhow!("apply update failed: HTTP {}", status))
                }
            }
            Ok(DiagnosticReply { status, body: None }) => {
                self.fail(UpdateStage::Apply, anyhow::anyhow!("apply update failed: HTTP {}", status))
            }
            Err(err) => self.fail(UpdateStage::Apply, err),
        }
    }

    fn fail(&mut self, stage: UpdateStage, err: anyhow::Error) -> Delivery {
        tracing::warn!(stage = stage.as_str(), error = %format!("{:#}", err), "update stage failed");
        self.state = GateState::Failed {
            stage,
            message: format!("{:#}", err),
        };
        Delivery::Failed(err)
    }

    /// Context switch: back to idle, in-flight results orphaned.
    pub fn reset(&mut self) {
        self.generation.advance();
        self.state = GateState::Idle;
        self.target = None;
    }
}
