// Scheduler settings view: aggregated status, workflow phases, jobs and config

pub mod backend;
pub mod console;
pub mod model;

pub use backend::SchedulerBackend;
pub use console::{RefreshHandle, RefreshReport, SchedulerConsole, SchedulerError};
pub use model::{
    BasicConfig, JobAction, PhaseStatus, ScheduledJob, SchedulerStatus, SchedulerView, WorkflowPhase,
    WORKFLOW_PHASES,
};
