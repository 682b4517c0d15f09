// /scheduler endpoints and their payloads
use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::client::{ApiClient, ApiRequest};
use crate::error::ClientResult;
use crate::scheduler::model::{BasicConfig, ScheduledJob};

/// `GET /scheduler/status`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulerStatusPayload {
    #[serde(default)]
    pub scheduler_running: bool,
    #[serde(default)]
    pub current_time: Option<String>,
    #[serde(default)]
    pub workflow: Option<WorkflowStatusPayload>,
}

/// `GET /scheduler/workflow/status`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowStatusPayload {
    #[serde(default)]
    pub phases: BTreeMap<String, PhaseState>,
    #[serde(default)]
    pub execution_history: Vec<ExecutionRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhaseState {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_execution: Option<String>,
    #[serde(default)]
    pub can_execute: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionRecord {
    #[serde(default)]
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub execution_time: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

impl ExecutionRecord {
    pub fn when(&self) -> Option<&str> {
        self.timestamp.as_deref().or(self.execution_time.as_deref())
    }
}

/// `GET /scheduler/config`; absent fields fall back to the console defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulerConfigRecord {
    pub scheduler_enabled: Option<bool>,
    pub auto_process_on_startup: Option<bool>,
    pub auto_suspend_when_no_data: Option<bool>,
    pub data_check_enabled: Option<bool>,
    pub workflow_interval_minutes: Option<u32>,
    pub batch_size: Option<u32>,
    pub min_batch_size: Option<u32>,
}

impl SchedulerConfigRecord {
    /// Zero intervals and batch sizes are treated as unset
    pub fn into_basic(self) -> BasicConfig {
        let defaults = BasicConfig::default();
        BasicConfig {
            scheduler_enabled: self.scheduler_enabled.unwrap_or(false),
            auto_process_on_startup: self.auto_process_on_startup.unwrap_or(false),
            auto_suspend_when_no_data: self.auto_suspend_when_no_data != Some(false),
            data_check_enabled: self.data_check_enabled != Some(false),
            workflow_interval_minutes: non_zero(self.workflow_interval_minutes)
                .unwrap_or(defaults.workflow_interval_minutes),
            batch_size: non_zero(self.batch_size).unwrap_or(defaults.batch_size),
            min_batch_size: non_zero(self.min_batch_size).unwrap_or(defaults.min_batch_size),
        }
    }
}

fn non_zero(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v != 0)
}

/// Jobs arrive either as a list, as a map keyed by job id, or wrapped in the
/// scheduler's `{count, jobs, scheduler_jobs}` summary
pub fn parse_jobs(data: Value) -> Vec<ScheduledJob> {
    match data {
        Value::Array(items) => items.into_iter().filter_map(parse_job).collect(),
        Value::Object(mut map) => {
            let live: Vec<ScheduledJob> = map
                .remove("scheduler_jobs")
                .map(parse_jobs)
                .unwrap_or_default();

            let Some(jobs) = map.remove("jobs") else {
                return live;
            };

            let mut parsed = match jobs {
                Value::Object(by_id) => by_id
                    .into_iter()
                    .filter_map(|(id, mut job)| {
                        if let Value::Object(fields) = &mut job {
                            fields.entry("id").or_insert(Value::String(id));
                        }
                        parse_job(job)
                    })
                    .collect(),
                other => parse_jobs(other),
            };

            for job in &mut parsed {
                if let Some(runtime) = live.iter().find(|l| l.id == job.id) {
                    job.next_run_time = job.next_run_time.take().or(runtime.next_run_time.clone());
                    job.trigger = job.trigger.take().or(runtime.trigger.clone());
                }
            }
            parsed
        }
        _ => Vec::new(),
    }
}

fn parse_job(value: Value) -> Option<ScheduledJob> {
    match serde_json::from_value(value) {
        Ok(job) => Some(job),
        Err(e) => {
            tracing::warn!("Skipping malformed scheduled job: {}", e);
            None
        }
    }
}

#[derive(Clone)]
pub struct SchedulerApi {
    client: ApiClient,
}

impl SchedulerApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn status(&self) -> ClientResult<SchedulerStatusPayload> {
        self.client.get_json("/scheduler/status", Value::Null).await
    }

    pub async fn enable(&self) -> ClientResult<Value> {
        self.client.send(ApiRequest::post("/scheduler/enable")).await
    }

    pub async fn disable(&self) -> ClientResult<Value> {
        self.client.send(ApiRequest::post("/scheduler/disable")).await
    }

    pub async fn workflow_status(&self) -> ClientResult<WorkflowStatusPayload> {
        self.client.get_json("/scheduler/workflow/status", Value::Null).await
    }

    pub async fn execute_workflow(&self) -> ClientResult<Value> {
        self.client.send(ApiRequest::post("/scheduler/workflow/execute")).await
    }

    pub async fn execute_phase(&self, phase: &str) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::post(format!("/scheduler/workflow/phases/{}/execute", phase)))
            .await
    }

    pub async fn jobs(&self) -> ClientResult<Vec<ScheduledJob>> {
        let data = self.client.send(ApiRequest::get("/scheduler/jobs")).await?;
        Ok(parse_jobs(data))
    }

    pub async fn pause_job(&self, job_id: &str) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::post(format!("/scheduler/jobs/{}/pause", job_id)))
            .await
    }

    pub async fn resume_job(&self, job_id: &str) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::post(format!("/scheduler/jobs/{}/resume", job_id)))
            .await
    }

    pub async fn trigger_job(&self, job_id: &str) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::post(format!("/scheduler/jobs/{}/trigger", job_id)))
            .await
    }

    pub async fn config(&self) -> ClientResult<SchedulerConfigRecord> {
        self.client.get_json("/scheduler/config", Value::Null).await
    }

    pub async fn update_config(&self, config: &BasicConfig) -> ClientResult<Value> {
        self.client
            .send(ApiRequest::put("/scheduler/config").json(config))
            .await
    }

    pub async fn statistics(&self) -> ClientResult<Value> {
        self.client.send(ApiRequest::get("/scheduler/statistics")).await
    }

    pub async fn health(&self) -> ClientResult<Value> {
        self.client.send(ApiRequest::get("/scheduler/health")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_record_applies_console_defaults() {
        let basic = SchedulerConfigRecord::default().into_basic();
        assert_eq!(basic, BasicConfig::default());

        let record: SchedulerConfigRecord = serde_json::from_value(json!({
            "scheduler_enabled": true,
            "auto_suspend_when_no_data": false,
            "workflow_interval_minutes": 0,
            "batch_size": 50,
            "api_timeout": 30
        }))
        .unwrap();
        let basic = record.into_basic();
        assert!(basic.scheduler_enabled);
        assert!(!basic.auto_suspend_when_no_data);
        assert!(basic.data_check_enabled);
        assert_eq!(basic.workflow_interval_minutes, 3);
        assert_eq!(basic.batch_size, 50);
    }

    #[test]
    fn jobs_from_scheduler_summary() {
        let jobs = parse_jobs(json!({
            "count": 2,
            "jobs": {
                "sync_job": {"name": "数据同步", "enabled": true},
                "scoring_job": {"name": "评分", "enabled": false}
            },
            "scheduler_jobs": [
                {"id": "sync_job", "name": "数据同步", "next_run_time": "2024-05-01T10:00:00", "trigger": "interval[0:03:00]"}
            ]
        }));

        assert_eq!(jobs.len(), 2);
        let sync = jobs.iter().find(|j| j.id == "sync_job").unwrap();
        assert_eq!(sync.next_run_time.as_deref(), Some("2024-05-01T10:00:00"));
        assert_eq!(sync.enabled, Some(true));
        let scoring = jobs.iter().find(|j| j.id == "scoring_job").unwrap();
        assert_eq!(scoring.trigger, None);
    }

    #[test]
    fn jobs_from_plain_list() {
        let jobs = parse_jobs(json!([
            {"id": "a", "name": "A"},
            {"name": "missing id"},
            {"id": "b"}
        ]));
        assert_eq!(jobs.iter().map(|j| j.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(parse_jobs(Value::Null).is_empty());
    }

    #[test]
    fn execution_record_prefers_timestamp() {
        let rec: ExecutionRecord = serde_json::from_value(json!({"execution_time": "t2"})).unwrap();
        assert_eq!(rec.when(), Some("t2"));
        let rec: ExecutionRecord =
            serde_json::from_value(json!({"timestamp": "t1", "execution_time": "t2"})).unwrap();
        assert_eq!(rec.when(), Some("t1"));
    }
}
