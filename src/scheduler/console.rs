use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::error::ClientError;
use crate::middleware::Notifier;

use super::backend::SchedulerBackend;
use super::model::{self, BasicConfig, JobAction, SchedulerStatus, SchedulerView};

#[derive(Debug, Error, PartialEq)]
pub enum SchedulerError {
    #[error("Unknown workflow phase: {0}")]
    UnknownPhase(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Sub-states that failed to load during one refresh round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub failed: Vec<&'static str>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn record<T>(&mut self, part: &'static str, result: &Result<T, ClientError>) {
        if let Err(e) = result {
            tracing::warn!("Failed to fetch scheduler {}: {}", part, e);
            self.failed.push(part);
        }
    }
}

/// Aggregates the scheduler endpoints into one view and keeps it current
#[derive(Clone)]
pub struct SchedulerConsole {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    backend: Arc<dyn SchedulerBackend>,
    notifier: Arc<dyn Notifier>,
    notify_success: bool,
    view: Mutex<SchedulerView>,
}

impl ConsoleInner {
    fn view(&self) -> MutexGuard<'_, SchedulerView> {
        self.view.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn success(&self, message: &str) {
        if self.notify_success {
            self.notifier.success(message);
        }
    }

    async fn fetch_status(&self) -> Result<(), ClientError> {
        let payload = self.backend.status().await?;
        self.view().status = SchedulerStatus::from(payload);
        Ok(())
    }

    async fn fetch_workflow(&self) -> Result<(), ClientError> {
        let payload = self.backend.workflow().await?;
        self.view().merge_workflow(&payload);
        Ok(())
    }

    async fn fetch_jobs(&self) -> Result<(), ClientError> {
        let jobs = self.backend.jobs().await?;
        self.view().jobs = jobs;
        Ok(())
    }

    async fn fetch_config(&self) -> Result<(), ClientError> {
        let record = self.backend.config().await?;
        self.view().config = record.into_basic();
        Ok(())
    }

    /// Status then workflow, the two sub-states that change on their own
    async fn refresh_volatile(&self) -> RefreshReport {
        let mut report = RefreshReport::default();
        report.record("status", &self.fetch_status().await);
        report.record("workflow", &self.fetch_workflow().await);
        report
    }
}

impl SchedulerConsole {
    pub fn new(backend: Arc<dyn SchedulerBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_success_notifications(backend, notifier, true)
    }

    /// With `notify_success` off only failures reach the user, through the client
    pub fn with_success_notifications(
        backend: Arc<dyn SchedulerBackend>,
        notifier: Arc<dyn Notifier>,
        notify_success: bool,
    ) -> Self {
        Self {
            inner: Arc::new(ConsoleInner {
                backend,
                notifier,
                notify_success,
                view: Mutex::new(SchedulerView::default()),
            }),
        }
    }

    pub fn snapshot(&self) -> SchedulerView {
        self.inner.view().clone()
    }

    /// Load all four sub-states concurrently. A failed fetch leaves its
    /// sub-state as it was and does not affect the others.
    pub async fn init(&self) -> RefreshReport {
        self.inner.view().loading = true;

        let (status, workflow, jobs, config) = futures::join!(
            self.inner.fetch_status(),
            self.inner.fetch_workflow(),
            self.inner.fetch_jobs(),
            self.inner.fetch_config(),
        );

        self.inner.view().loading = false;

        let mut report = RefreshReport::default();
        report.record("status", &status);
        report.record("workflow", &workflow);
        report.record("jobs", &jobs);
        report.record("config", &config);
        report
    }

    pub async fn refresh(&self) -> RefreshReport {
        self.init().await
    }

    /// Persist the settings; the local copy changes only once the backend
    /// accepts them
    pub async fn save_config(&self, config: BasicConfig) -> Result<(), SchedulerError> {
        self.inner.view().loading = true;
        let result = self.inner.backend.update_config(&config).await;

        let outcome = match result {
            Ok(_) => {
                self.inner.view().config = config;
                self.inner.success("配置保存成功");
                if let Err(e) = self.inner.fetch_status().await {
                    tracing::warn!("Failed to refresh scheduler status after saving config: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Saving scheduler config failed: {}", e);
                Err(e.into())
            }
        };

        self.inner.view().loading = false;
        outcome
    }

    pub async fn execute_phase(&self, key: &str) -> Result<Value, SchedulerError> {
        let phase = model::phase(key).ok_or_else(|| SchedulerError::UnknownPhase(key.to_string()))?;

        let result = self.inner.backend.execute_phase(phase.key).await.map_err(|e| {
            tracing::warn!("{}执行失败: {}", phase.name, e);
            e
        })?;

        self.inner.success(&format!("{}执行成功", phase.name));
        if let Err(e) = self.inner.fetch_workflow().await {
            tracing::warn!("Failed to refresh workflow after executing {}: {}", phase.key, e);
        }
        Ok(result)
    }

    pub async fn job_action(&self, action: JobAction, job_id: &str) -> Result<Value, SchedulerError> {
        let result = self
            .inner
            .backend
            .job_action(action, job_id)
            .await
            .map_err(|e| {
                tracing::warn!("Job {} {} failed: {}", job_id, action.as_str(), e);
                e
            })?;

        self.inner.success("操作成功");
        if let Err(e) = self.inner.fetch_jobs().await {
            tracing::warn!("Failed to refresh jobs after {} {}: {}", action.as_str(), job_id, e);
        }
        Ok(result)
    }

    pub async fn pause_job(&self, job_id: &str) -> Result<Value, SchedulerError> {
        self.job_action(JobAction::Pause, job_id).await
    }

    pub async fn resume_job(&self, job_id: &str) -> Result<Value, SchedulerError> {
        self.job_action(JobAction::Resume, job_id).await
    }

    pub async fn trigger_job(&self, job_id: &str) -> Result<Value, SchedulerError> {
        self.job_action(JobAction::Trigger, job_id).await
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<Value, SchedulerError> {
        let result = self.inner.backend.set_enabled(enabled).await?;

        self.inner.success(if enabled { "调度器已启用" } else { "调度器已停用" });
        if let Err(e) = self.inner.fetch_status().await {
            tracing::warn!("Failed to refresh scheduler status: {}", e);
        }
        Ok(result)
    }

    /// Refresh status and workflow every `period` until the handle is stopped
    /// or dropped, or every console clone is gone.
    pub fn start_auto_refresh(&self, period: Duration) -> RefreshHandle {
        let state = Arc::downgrade(&self.inner);
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(refresh_loop(state, period, stop_rx));
        tracing::debug!("Scheduler auto refresh started ({:?})", period);

        RefreshHandle {
            stop: Some(stop_tx),
            task: Some(task),
        }
    }
}

async fn refresh_loop(state: Weak<ConsoleInner>, period: Duration, mut stop: oneshot::Receiver<()>) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = ticker.tick() => {
                let Some(inner) = state.upgrade() else {
                    break;
                };
                let report = inner.refresh_volatile().await;
                if !report.is_complete() {
                    tracing::debug!("Auto refresh incomplete: {:?}", report.failed);
                }
            }
        }
    }

    tracing::debug!("Scheduler auto refresh stopped");
}

/// Owns the auto refresh task; dropping it stops the task
pub struct RefreshHandle {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// Once this returns no further timer-driven fetch is issued. A round
    /// already in flight is allowed to finish first.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::error!("Scheduler auto refresh task failed: {}", e);
                }
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}
