//! Provisioning workflow driver.
//!
//! Sequences tool invocations against one working directory:
//! `Uninitialized -> Initialized -> {Validated | Planned} -> Applied`, with `Failed`
//! reachable from every state. Steps requested out of order are refused before the
//! tool is invoked. Callers must not run two workflows on the same directory at once.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::terraform::{ProvisioningTool, StepOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Uninitialized,
    Initialized,
    Validated,
    Planned,
    Applied,
    Failed,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Uninitialized => "uninitialized",
            WorkflowState::Initialized => "initialized",
            WorkflowState::Validated => "validated",
            WorkflowState::Planned => "planned",
            WorkflowState::Applied => "applied",
            WorkflowState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Init,
    Validate,
    Plan,
    Apply,
    Graph,
}

impl Step {
    fn args(self) -> &'static [&'static str] {
        match self {
            Step::Init => &["init", "-input=false", "-no-color"],
            Step::Validate => &["validate", "-no-color"],
            Step::Plan => &["plan", "-input=false", "-no-color"],
            Step::Apply => &["apply", "-input=false", "-no-color", "-auto-approve"],
            Step::Graph => &["graph"],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Init => "init",
            Step::Validate => "validate",
            Step::Plan => "plan",
            Step::Apply => "apply",
            Step::Graph => "graph",
        };
        f.write_str(name)
    }
}

/// Drives one provisioning tool through the workflow for a single directory.
pub struct Workflow<'a> {
    tool: &'a dyn ProvisioningTool,
    working_dir: PathBuf,
    state: WorkflowState,
    halt_on_failure: bool,
}

impl<'a> Workflow<'a> {
    pub fn new<P: Into<PathBuf>>(tool: &'a dyn ProvisioningTool, working_dir: P) -> Self {
        Self {
            tool,
            working_dir: working_dir.into(),
            state: WorkflowState::Uninitialized,
            halt_on_failure: true,
        }
    }

    /// When disabled, failed steps are logged and the workflow carries on.
    pub fn halt_on_failure(mut self, halt: bool) -> Self {
        self.halt_on_failure = halt;
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Prepares the working directory. Safe to repeat.
    pub fn initialize(&mut self) -> Result<StepOutcome> {
        self.require(Step::Init, |state| state != WorkflowState::Failed)?;
        let next = match self.state {
            WorkflowState::Uninitialized => WorkflowState::Initialized,
            current => current,
        };
        self.execute(Step::Init, next)
    }

    pub fn validate(&mut self) -> Result<StepOutcome> {
        self.require(Step::Validate, is_inspectable)?;
        self.execute(Step::Validate, WorkflowState::Validated)
    }

    pub fn plan(&mut self) -> Result<StepOutcome> {
        self.require(Step::Plan, is_inspectable)?;
        self.execute(Step::Plan, WorkflowState::Planned)
    }

    /// Applies the planned changes once the operator agrees.
    ///
    /// With `auto_approve` the prompter is not consulted. Returns `Ok(None)` when the
    /// operator declines; the tool is not invoked and the state is unchanged.
    pub fn apply(
        &mut self,
        prompt: &dyn Prompter,
        auto_approve: bool,
    ) -> Result<Option<StepOutcome>> {
        self.require(Step::Apply, |state| state == WorkflowState::Planned)?;
        let question = format!("Apply the planned changes in {}?", self.working_dir.display());
        if !prompt.confirm(auto_approve, question)? {
            info!("Apply declined for {}", self.working_dir.display());
            return Ok(None);
        }
        self.execute(Step::Apply, WorkflowState::Applied).map(Some)
    }

    /// Returns the dependency graph in DOT format. Does not change the state.
    pub fn graph(&mut self) -> Result<StepOutcome> {
        self.require(Step::Graph, |state| {
            !matches!(state, WorkflowState::Uninitialized | WorkflowState::Failed)
        })?;
        let current = self.state;
        self.execute(Step::Graph, current)
    }

    fn require(&self, step: Step, allowed: impl Fn(WorkflowState) -> bool) -> Result<()> {
        if allowed(self.state) {
            Ok(())
        } else {
            Err(Error::InvalidTransition { step: step.to_string(), state: self.state.to_string() })
        }
    }

    fn execute(&mut self, step: Step, next: WorkflowState) -> Result<StepOutcome> {
        info!("Running {step} in {}", self.working_dir.display());
        let outcome = match self.tool.run(&self.working_dir, step.args()) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state = WorkflowState::Failed;
                return Err(e);
            }
        };
        log_outcome(step, &outcome);

        if !outcome.success() {
            if self.halt_on_failure {
                self.state = WorkflowState::Failed;
                return Err(Error::ExternalToolFailure {
                    step: step.to_string(),
                    status: outcome.status,
                    message: outcome.error.unwrap_or(outcome.message),
                });
            }
            warn!("{step} failed; continuing because halting on failure is disabled");
        }

        self.state = next;
        Ok(outcome)
    }
}

fn is_inspectable(state: WorkflowState) -> bool {
    matches!(
        state,
        WorkflowState::Initialized | WorkflowState::Validated | WorkflowState::Planned
    )
}

fn log_outcome(step: Step, outcome: &StepOutcome) {
    let error = outcome.error.as_deref().unwrap_or("None");
    if outcome.success() {
        info!("{step} exit code: {}", outcome.status);
        info!("{step} message: {}", outcome.message.trim_end());
        info!("{step} error: {error}");
    } else {
        error!("{step} exit code: {}", outcome.status);
        error!("{step} message: {}", outcome.message.trim_end());
        error!("{step} error: {error}");
    }
}
