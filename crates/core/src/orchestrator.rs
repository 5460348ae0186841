//! Pipeline Orchestrator
//!
//! Runs curriculum, per-module resources and project planning strictly in
//! sequence, retries service failures per the injected [`RetryPolicy`], and
//! decides which failures abort the run and which only degrade one section.
//!
//! All per-run state lives in a [`RunContext`]; the orchestrator itself is
//! read-only, so independent runs never share mutable state.

use crate::agent_client::AgentClient;
use crate::agents::{CurriculumAgent, ProjectPlannerAgent, ResourceFinderAgent};
use crate::config::Config;
use crate::error::{AgentError, ServiceError};
use crate::models::{LearningPlan, ModulePlan, ProjectIdea, ProjectSection, Provenance, Topic};
use crate::progress::{ProgressEvent, Stage};
use crate::prompts::Prompts;
use crate::retry::RetryPolicy;
use anyhow::Result;
use chrono::Utc;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, instrument, warn};
use uuid::Uuid;

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Read-only settings shared by every run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub prompts: Prompts,
    pub retry: RetryPolicy,
    /// Bounded wait for a single agent call.
    pub call_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            prompts: Prompts::default(),
            retry: RetryPolicy::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            prompts: Prompts::load(config.prompts_path.as_deref())?,
            retry: RetryPolicy::default().with_max_attempts(config.max_attempts),
            call_timeout: config.call_timeout,
        })
    }
}

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    ModulesReady,
    ResourcesReady,
    Complete,
    Failed,
    Cancelled,
}

/// Why a run stopped without a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineFailure {
    pub stage: Stage,
    /// Index of the module being processed, for resource-stage failures.
    pub module: Option<usize>,
    pub error: AgentError,
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipeline failed at {} stage", self.stage)?;
        if let Some(index) = self.module {
            write!(f, " (module {})", index)?;
        }
        write!(f, ": {}", self.error)
    }
}

impl std::error::Error for PipelineFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every module had its resource lookup attempted; sections may be degraded.
    Complete(LearningPlan),
    Failed(PipelineFailure),
    Cancelled,
}

impl RunOutcome {
    pub fn plan(&self) -> Option<&LearningPlan> {
        match self {
            RunOutcome::Complete(plan) => Some(plan),
            _ => None,
        }
    }

    pub fn into_plan(self) -> Option<LearningPlan> {
        match self {
            RunOutcome::Complete(plan) => Some(plan),
            _ => None,
        }
    }
}

/// State owned by a single run.
pub struct RunContext {
    pub run_id: Uuid,
    pub topic: Topic,
    /// Modules whose resource lookup has finished, in curriculum order.
    pub modules: Vec<ModulePlan>,
    pub state: RunState,
    progress: Option<mpsc::Sender<ProgressEvent>>,
    cancel: CancellationToken,
}

impl RunContext {
    pub fn new(
        topic: Topic,
        progress: Option<mpsc::Sender<ProgressEvent>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            topic,
            modules: Vec::new(),
            state: RunState::Start,
            progress,
            cancel,
        }
    }

    async fn emit(&self, event: ProgressEvent) {
        if self.cancel.is_cancelled() {
            return;
        }
        let Some(tx) = &self.progress else {
            return;
        };
        // A send parked on a full channel must not land after cancellation.
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {}
            sent = tx.send(event) => {
                if sent.is_err() {
                    warn!("Failed to send progress event: receiver dropped.");
                }
            }
        }
    }
}

enum CallError {
    Cancelled,
    Agent(AgentError),
}

/// Sequences the three agents for one topic at a time.
pub struct Orchestrator {
    curriculum: CurriculumAgent,
    resources: ResourceFinderAgent,
    planner: ProjectPlannerAgent,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn AgentClient>, settings: &PipelineSettings) -> Self {
        Self {
            curriculum: CurriculumAgent::new(client.clone(), settings.prompts.curriculum.clone()),
            resources: ResourceFinderAgent::new(
                client.clone(),
                settings.prompts.resource_finder.clone(),
            ),
            planner: ProjectPlannerAgent::new(client, settings.prompts.project_planner.clone()),
            retry: settings.retry.clone(),
            call_timeout: settings.call_timeout,
        }
    }

    /// Runs the whole pipeline for `topic` in a fresh [`RunContext`].
    pub async fn run(
        &self,
        topic: Topic,
        progress: Option<mpsc::Sender<ProgressEvent>>,
        cancel: CancellationToken,
    ) -> RunOutcome {
        let mut ctx = RunContext::new(topic, progress, cancel);
        let span = info_span!("pipeline_run", run_id = %ctx.run_id, topic = %ctx.topic);
        self.execute(&mut ctx).instrument(span).await
    }

    /// Drives `ctx` from `Start` to a terminal state.
    pub async fn execute(&self, ctx: &mut RunContext) -> RunOutcome {
        info!("Starting pipeline run");

        // Start -> ModulesReady
        ctx.emit(ProgressEvent::CurriculumStarted).await;
        let modules = match self
            .call(ctx, Stage::Curriculum, None, || {
                self.curriculum.generate_modules(&ctx.topic)
            })
            .await
        {
            Ok(modules) => modules,
            Err(CallError::Cancelled) => return cancelled(ctx),
            Err(CallError::Agent(error)) => {
                return fail(ctx, Stage::Curriculum, None, error).await;
            }
        };
        ctx.state = RunState::ModulesReady;
        ctx.emit(ProgressEvent::ModulesReady {
            count: modules.len(),
        })
        .await;

        // ModulesReady -> ResourcesReady, one module at a time in index order.
        let total = modules.len();
        for module in &modules {
            ctx.emit(ProgressEvent::ResourcesStarted {
                index: module.index,
                total,
                title: module.title.clone(),
            })
            .await;

            let found = self
                .call(ctx, Stage::Resources, Some(module.index), || {
                    self.resources.find_resources(module)
                })
                .await;
            let (resources, source) = match found {
                Ok(resources) => (resources, Provenance::Agent),
                Err(CallError::Cancelled) => return cancelled(ctx),
                Err(CallError::Agent(AgentError::Parse(failure))) => {
                    warn!(
                        module = module.index,
                        reason = %failure.reason,
                        "No usable resources, continuing with an empty set"
                    );
                    (
                        Vec::new(),
                        Provenance::Fallback {
                            reason: failure.reason,
                        },
                    )
                }
                Err(CallError::Agent(error)) => {
                    return fail(ctx, Stage::Resources, Some(module.index), error).await;
                }
            };

            ctx.emit(ProgressEvent::ResourcesAttached {
                index: module.index,
                total,
                found: resources.len(),
                degraded: source.is_fallback(),
            })
            .await;
            ctx.modules.push(ModulePlan {
                module: module.clone(),
                resources,
                resources_source: source,
            });
        }
        ctx.state = RunState::ResourcesReady;

        // ResourcesReady -> Complete; a missing project only degrades the plan.
        ctx.emit(ProgressEvent::ProjectStarted).await;
        let project = match self
            .call(ctx, Stage::Project, None, || self.planner.plan_project(&modules))
            .await
        {
            Ok(idea) => ProjectSection {
                idea,
                source: Provenance::Agent,
            },
            Err(CallError::Cancelled) => return cancelled(ctx),
            Err(CallError::Agent(error)) => {
                warn!(error = %error, "Project planning failed, using placeholder");
                ProjectSection {
                    idea: ProjectIdea::placeholder(),
                    source: Provenance::Fallback {
                        reason: error.to_string(),
                    },
                }
            }
        };
        ctx.emit(ProgressEvent::ProjectReady {
            degraded: project.source.is_fallback(),
        })
        .await;

        if ctx.cancel.is_cancelled() {
            return cancelled(ctx);
        }

        let plan = LearningPlan {
            topic: ctx.topic.clone(),
            modules: std::mem::take(&mut ctx.modules),
            project,
            generated_at: Utc::now(),
        };
        ctx.state = RunState::Complete;
        let degraded = plan.is_degraded();
        ctx.emit(ProgressEvent::Completed { degraded }).await;
        info!(
            modules = plan.modules.len(),
            degraded,
            degraded_sections = ?plan.degraded_sections(),
            "Pipeline run complete"
        );
        RunOutcome::Complete(plan)
    }

    /// Calls an agent with the per-call timeout and the retry policy.
    ///
    /// Parse failures return immediately; service failures (timeouts
    /// included) are retried while the policy allows.
    #[instrument(name = "agent_call", skip_all, fields(stage = %stage, module = ?module))]
    async fn call<T, F, Fut>(
        &self,
        ctx: &RunContext,
        stage: Stage,
        module: Option<usize>,
        mut op: F,
    ) -> Result<T, CallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AgentError>>,
    {
        let mut attempt: u32 = 1;
        loop {
            let result = tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => return Err(CallError::Cancelled),
                result = tokio::time::timeout(self.call_timeout, op()) => result,
            };

            let mut error = match result {
                Ok(Ok(value)) if ctx.cancel.is_cancelled() => {
                    drop(value);
                    return Err(CallError::Cancelled);
                }
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(AgentError::Parse(failure))) => {
                    return Err(CallError::Agent(AgentError::Parse(failure)));
                }
                Ok(Err(AgentError::Service(error))) => error,
                Err(_elapsed) => ServiceError::timeout(stage.role(), self.call_timeout),
            };
            error.attempts = attempt;

            if !self.retry.should_retry(&error, attempt) {
                warn!(attempts = attempt, error = %error, "Agent call failed");
                return Err(CallError::Agent(AgentError::Service(error)));
            }

            let delay = self.retry.backoff_for(attempt);
            warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Agent call failed, retrying"
            );
            ctx.emit(ProgressEvent::Retrying {
                stage,
                module,
                attempt,
                max_attempts: self.retry.max_attempts,
                delay_ms: delay.as_millis() as u64,
                reason: error.kind.to_string(),
            })
            .await;

            tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => return Err(CallError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }
}

fn cancelled(ctx: &mut RunContext) -> RunOutcome {
    ctx.state = RunState::Cancelled;
    ctx.modules.clear();
    info!("Pipeline run cancelled");
    RunOutcome::Cancelled
}

async fn fail(
    ctx: &mut RunContext,
    stage: Stage,
    module: Option<usize>,
    error: AgentError,
) -> RunOutcome {
    ctx.state = RunState::Failed;
    ctx.modules.clear();
    let failure = PipelineFailure {
        stage,
        module,
        error,
    };
    warn!(error = %failure, "Pipeline run failed");
    ctx.emit(ProgressEvent::Failed {
        stage,
        module,
        message: failure.error.to_string(),
    })
    .await;
    RunOutcome::Failed(failure)
}
