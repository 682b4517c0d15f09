use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::api::scheduler::{SchedulerStatusPayload, WorkflowStatusPayload};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub last_execution: Option<String>,
    pub current_time: Option<String>,
}

impl From<SchedulerStatusPayload> for SchedulerStatus {
    fn from(payload: SchedulerStatusPayload) -> Self {
        // history is oldest first
        let last_execution = payload
            .workflow
            .as_ref()
            .and_then(|w| w.execution_history.last())
            .and_then(|record| record.when())
            .map(str::to_string);

        Self {
            running: payload.scheduler_running,
            last_execution,
            current_time: payload.current_time,
        }
    }
}

/// Editable scheduler settings, serialized with the backend's field names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicConfig {
    pub scheduler_enabled: bool,
    pub auto_process_on_startup: bool,
    pub auto_suspend_when_no_data: bool,
    pub data_check_enabled: bool,
    pub workflow_interval_minutes: u32,
    pub batch_size: u32,
    pub min_batch_size: u32,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            scheduler_enabled: false,
            auto_process_on_startup: false,
            auto_suspend_when_no_data: true,
            data_check_enabled: true,
            workflow_interval_minutes: 3,
            batch_size: 100,
            min_batch_size: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Pending,
    Running,
    Success,
    Failed,
    Disabled,
    Unknown,
}

impl PhaseStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "pending" => PhaseStatus::Pending,
            "running" => PhaseStatus::Running,
            "success" => PhaseStatus::Success,
            "failed" => PhaseStatus::Failed,
            "disabled" => PhaseStatus::Disabled,
            _ => PhaseStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseStatus::Pending => "pending",
            PhaseStatus::Running => "running",
            PhaseStatus::Success => "success",
            PhaseStatus::Failed => "failed",
            PhaseStatus::Disabled => "disabled",
            PhaseStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowPhase {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub enabled: bool,
    pub status: PhaseStatus,
}

impl WorkflowPhase {
    const fn pending(key: &'static str, name: &'static str, description: &'static str) -> Self {
        Self {
            key,
            name,
            description,
            enabled: true,
            status: PhaseStatus::Pending,
        }
    }
}

pub const WORKFLOW_PHASES: [WorkflowPhase; 4] = [
    WorkflowPhase::pending("data_sync", "数据同步", "从table1同步最新数据到questions和answers表"),
    WorkflowPhase::pending("classification", "问题分类", "调用分类API对新问题进行分类"),
    WorkflowPhase::pending("answer_generation", "答案生成", "调用AI API生成问题答案"),
    WorkflowPhase::pending("scoring", "评分处理", "对生成的答案进行质量评分"),
];

pub fn phase(key: &str) -> Option<&'static WorkflowPhase> {
    WORKFLOW_PHASES.iter().find(|p| p.key == key)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid job id: {}", other))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    Pause,
    Resume,
    Trigger,
}

impl JobAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobAction::Pause => "pause",
            JobAction::Resume => "resume",
            JobAction::Trigger => "trigger",
        }
    }
}

/// Everything the scheduler settings screen shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerView {
    pub status: SchedulerStatus,
    pub workflow_phases: Vec<WorkflowPhase>,
    pub jobs: Vec<ScheduledJob>,
    pub config: BasicConfig,
    pub loading: bool,
}

impl Default for SchedulerView {
    fn default() -> Self {
        Self {
            status: SchedulerStatus::default(),
            workflow_phases: WORKFLOW_PHASES.to_vec(),
            jobs: Vec::new(),
            config: BasicConfig::default(),
            loading: false,
        }
    }
}

impl SchedulerView {
    /// Only status and enabled are taken from the server, and only for
    /// phases the console knows
    pub fn merge_workflow(&mut self, payload: &WorkflowStatusPayload) {
        for phase in &mut self.workflow_phases {
            if let Some(server) = payload.phases.get(phase.key) {
                phase.status = PhaseStatus::parse(&server.status);
                phase.enabled = phase.status != PhaseStatus::Disabled;
            }
        }
    }

    pub fn phase(&self, key: &str) -> Option<&WorkflowPhase> {
        self.workflow_phases.iter().find(|p| p.key == key)
    }
}
