use async_trait::async_trait;
use serde_json::Value;

use crate::api::scheduler::{SchedulerApi, SchedulerConfigRecord, SchedulerStatusPayload, WorkflowStatusPayload};
use crate::error::ClientResult;

use super::model::{BasicConfig, JobAction, ScheduledJob};

/// The scheduler calls the console aggregates over
#[async_trait]
pub trait SchedulerBackend: Send + Sync {
    async fn status(&self) -> ClientResult<SchedulerStatusPayload>;
    async fn workflow(&self) -> ClientResult<WorkflowStatusPayload>;
    async fn jobs(&self) -> ClientResult<Vec<ScheduledJob>>;
    async fn config(&self) -> ClientResult<SchedulerConfigRecord>;

    async fn update_config(&self, config: &BasicConfig) -> ClientResult<Value>;
    async fn execute_phase(&self, key: &str) -> ClientResult<Value>;
    async fn job_action(&self, action: JobAction, job_id: &str) -> ClientResult<Value>;
    async fn set_enabled(&self, enabled: bool) -> ClientResult<Value>;
}

#[async_trait]
impl SchedulerBackend for SchedulerApi {
    async fn status(&self) -> ClientResult<SchedulerStatusPayload> {
        SchedulerApi::status(self).await
    }

    async fn workflow(&self) -> ClientResult<WorkflowStatusPayload> {
        self.workflow_status().await
    }

    async fn jobs(&self) -> ClientResult<Vec<ScheduledJob>> {
        SchedulerApi::jobs(self).await
    }

    async fn config(&self) -> ClientResult<SchedulerConfigRecord> {
        SchedulerApi::config(self).await
    }

    async fn update_config(&self, config: &BasicConfig) -> ClientResult<Value> {
        SchedulerApi::update_config(self, config).await
    }

    async fn execute_phase(&self, key: &str) -> ClientResult<Value> {
        SchedulerApi::execute_phase(self, key).await
    }

    async fn job_action(&self, action: JobAction, job_id: &str) -> ClientResult<Value> {
        match action {
            JobAction::Pause => self.pause_job(job_id).await,
            JobAction::Resume => self.resume_job(job_id).await,
            JobAction::Trigger => self.trigger_job(job_id).await,
        }
    }

    async fn set_enabled(&self, enabled: bool) -> ClientResult<Value> {
        if enabled {
            self.enable().await
        } else {
            self.disable().await
        }
    }
}
