//! Progress Events
//!
//! What the orchestrator reports after each stage transition. Presentation
//! adapters consume these without the core knowing about any particular UI.

use crate::error::Role;
use serde::Serialize;
use std::fmt;

/// One of the three sequential phases of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Curriculum,
    Resources,
    Project,
}

impl Stage {
    /// The agent role that serves this stage.
    pub fn role(&self) -> Role {
        match self {
            Stage::Curriculum => Role::Curriculum,
            Stage::Resources => Role::ResourceFinder,
            Stage::Project => Role::ProjectPlanner,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Curriculum => "curriculum",
            Stage::Resources => "resources",
            Stage::Project => "project",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    CurriculumStarted,
    ModulesReady {
        count: usize,
    },
    ResourcesStarted {
        index: usize,
        total: usize,
        title: String,
    },
    ResourcesAttached {
        index: usize,
        total: usize,
        found: usize,
        degraded: bool,
    },
    Retrying {
        stage: Stage,
        module: Option<usize>,
        attempt: u32,
        max_attempts: u32,
        delay_ms: u64,
        reason: String,
    },
    ProjectStarted,
    ProjectReady {
        degraded: bool,
    },
    Completed {
        degraded: bool,
    },
    Failed {
        stage: Stage,
        module: Option<usize>,
        message: String,
    },
}

impl ProgressEvent {
    /// The stage the event belongs to, if it belongs to one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ProgressEvent::CurriculumStarted | ProgressEvent::ModulesReady { .. } => {
                Some(Stage::Curriculum)
            }
            ProgressEvent::ResourcesStarted { .. } | ProgressEvent::ResourcesAttached { .. } => {
                Some(Stage::Resources)
            }
            ProgressEvent::ProjectStarted | ProgressEvent::ProjectReady { .. } => {
                Some(Stage::Project)
            }
            ProgressEvent::Retrying { stage, .. } | ProgressEvent::Failed { stage, .. } => {
                Some(*stage)
            }
            ProgressEvent::Completed { .. } => None,
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::CurriculumStarted => write!(f, "generating curriculum"),
            ProgressEvent::ModulesReady { count } => {
                write!(f, "curriculum ready: {} modules", count)
            }
            ProgressEvent::ResourcesStarted {
                index,
                total,
                title,
            } => write!(f, "resources for module {} of {}: {}", index, total, title),
            ProgressEvent::ResourcesAttached {
                index,
                total,
                found,
                degraded,
            } => {
                if *degraded {
                    write!(
                        f,
                        "resources for module {} of {}: none found, continuing without",
                        index, total
                    )
                } else {
                    write!(
                        f,
                        "resources for module {} of {}: found {}",
                        index, total, found
                    )
                }
            }
            ProgressEvent::Retrying {
                stage,
                module,
                attempt,
                max_attempts,
                delay_ms,
                reason,
            } => {
                write!(f, "retrying {}", stage)?;
                if let Some(index) = module {
                    write!(f, " for module {}", index)?;
                }
                write!(
                    f,
                    " (attempt {} of {} in {}ms): {}",
                    attempt + 1,
                    max_attempts,
                    delay_ms,
                    reason
                )
            }
            ProgressEvent::ProjectStarted => write!(f, "planning capstone project"),
            ProgressEvent::ProjectReady { degraded: false } => write!(f, "capstone project ready"),
            ProgressEvent::ProjectReady { degraded: true } => {
                write!(f, "capstone project unavailable, using placeholder")
            }
            ProgressEvent::Completed { degraded: false } => write!(f, "plan complete"),
            ProgressEvent::Completed { degraded: true } => {
                write!(f, "plan complete with fallback sections")
            }
            ProgressEvent::Failed {
                stage,
                module,
                message,
            } => {
                write!(f, "failed at {} stage", stage)?;
                if let Some(index) = module {
                    write!(f, " (module {})", index)?;
                }
                write!(f, ": {}", message)
            }
        }
    }
}
