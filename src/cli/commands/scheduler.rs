use std::sync::Arc;
use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use serde_json::json;

use crate::api::SchedulerApi;
use crate::cli::utils::{output_scheduler_view, output_success, output_value};
use crate::cli::{ConsoleContext, OutputFormat};
use crate::scheduler::{BasicConfig, JobAction, SchedulerConsole, WORKFLOW_PHASES};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum JobActionArg {
    Pause,
    Resume,
    Trigger,
}

impl From<JobActionArg> for JobAction {
    fn from(arg: JobActionArg) -> Self {
        match arg {
            JobActionArg::Pause => JobAction::Pause,
            JobActionArg::Resume => JobAction::Resume,
            JobActionArg::Trigger => JobAction::Trigger,
        }
    }
}

#[derive(Subcommand)]
pub enum SchedulerCommands {
    #[command(about = "Show scheduler status, workflow phases, jobs and config")]
    Status,

    #[command(about = "Keep refreshing status and workflow, printing each round")]
    Watch {
        #[arg(long, help = "Refresh period in seconds (defaults to QA_REFRESH_INTERVAL_SECS)")]
        interval: Option<u64>,
        #[arg(long, default_value_t = 10, help = "Number of refresh rounds to print")]
        rounds: u32,
    },

    #[command(about = "Update scheduler settings; unspecified fields keep their current value")]
    SaveConfig {
        #[arg(long, help = "Workflow interval in minutes")]
        interval: Option<u32>,
        #[arg(long, help = "Batch size")]
        batch_size: Option<u32>,
        #[arg(long, help = "Minimum batch size")]
        min_batch_size: Option<u32>,
        #[arg(long, help = "Scheduler enabled (true/false)")]
        enabled: Option<bool>,
        #[arg(long, help = "Process on startup (true/false)")]
        auto_start: Option<bool>,
        #[arg(long, help = "Suspend when there is no new data (true/false)")]
        auto_suspend: Option<bool>,
        #[arg(long, help = "Check for new data before running (true/false)")]
        data_check: Option<bool>,
    },

    #[command(about = "Run one workflow phase now")]
    Execute {
        #[arg(help = "Phase key: data_sync, classification, answer_generation or scoring")]
        phase: String,
    },

    #[command(about = "Pause, resume or trigger a scheduled job")]
    Job {
        #[arg(value_enum)]
        action: JobActionArg,
        #[arg(help = "Job id")]
        id: String,
    },

    #[command(about = "Start the scheduler")]
    Enable,

    #[command(about = "Stop the scheduler")]
    Disable,

    #[command(about = "List workflow phases")]
    Phases,
}

/// Flags given to `save-config`; `None` keeps the server's current value
#[derive(Debug, Default, Clone)]
struct ConfigChanges {
    interval: Option<u32>,
    batch_size: Option<u32>,
    min_batch_size: Option<u32>,
    enabled: Option<bool>,
    auto_start: Option<bool>,
    auto_suspend: Option<bool>,
    data_check: Option<bool>,
}

impl ConfigChanges {
    fn apply(&self, config: &mut BasicConfig) -> anyhow::Result<()> {
        if let Some(v) = self.interval {
            anyhow::ensure!(v > 0, "Interval must be at least one minute");
            config.workflow_interval_minutes = v;
        }
        if let Some(v) = self.batch_size {
            config.batch_size = v;
        }
        if let Some(v) = self.min_batch_size {
            config.min_batch_size = v;
        }
        if let Some(v) = self.enabled {
            config.scheduler_enabled = v;
        }
        if let Some(v) = self.auto_start {
            config.auto_process_on_startup = v;
        }
        if let Some(v) = self.auto_suspend {
            config.auto_suspend_when_no_data = v;
        }
        if let Some(v) = self.data_check {
            config.data_check_enabled = v;
        }
        Ok(())
    }
}

/// Merge `changes` onto the server's current settings and write them back.
///
/// Refuses to write when the current settings could not be read, since the
/// view would still hold defaults for every untouched field.
async fn save_config(console: &SchedulerConsole, changes: &ConfigChanges) -> anyhow::Result<BasicConfig> {
    let report = console.init().await;
    if report.failed.contains(&"config") {
        anyhow::bail!("Could not load the current scheduler config; nothing was saved");
    }

    let mut config = console.snapshot().config;
    changes.apply(&mut config)?;
    console.save_config(config).await?;
    Ok(console.snapshot().config)
}

fn console(ctx: &ConsoleContext) -> SchedulerConsole {
    SchedulerConsole::with_success_notifications(
        Arc::new(SchedulerApi::new(ctx.client.clone())),
        ctx.client.notifier(),
        ctx.config.ui.notify_success,
    )
}

pub async fn handle(cmd: SchedulerCommands, ctx: &ConsoleContext, output_format: OutputFormat) -> anyhow::Result<()> {
    if !matches!(cmd, SchedulerCommands::Phases) {
        ctx.require_session()?;
    }
    let console = console(ctx);

    match cmd {
        SchedulerCommands::Status => {
            let report = console.init().await;
            if !report.is_complete() {
                tracing::warn!("Partial scheduler view, failed: {}", report.failed.join(", "));
            }
            output_scheduler_view(&output_format, &console.snapshot())
        }
        SchedulerCommands::Watch { interval, rounds } => {
            let period = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| ctx.config.ui.refresh_interval());
            anyhow::ensure!(!period.is_zero(), "Refresh interval must be positive");

            console.init().await;
            output_scheduler_view(&output_format, &console.snapshot())?;

            let handle = console.start_auto_refresh(period);
            for _ in 0..rounds {
                tokio::time::sleep(period).await;
                output_scheduler_view(&output_format, &console.snapshot())?;
            }
            handle.stop().await;
            Ok(())
        }
        SchedulerCommands::SaveConfig {
            interval,
            batch_size,
            min_batch_size,
            enabled,
            auto_start,
            auto_suspend,
            data_check,
        } => {
            let changes = ConfigChanges {
                interval,
                batch_size,
                min_batch_size,
                enabled,
                auto_start,
                auto_suspend,
                data_check,
            };
            let config = save_config(&console, &changes).await?;
            output_success(
                &output_format,
                "配置保存成功",
                Some(json!({ "config": config })),
            )
        }
        SchedulerCommands::Execute { phase } => {
            let result = console.execute_phase(&phase).await?;
            output_success(&output_format, &format!("Phase {} executed", phase), Some(json!({ "result": result })))
        }
        SchedulerCommands::Job { action, id } => {
            let action = JobAction::from(action);
            console.job_action(action, &id).await?;
            let job = console.snapshot().jobs.into_iter().find(|job| job.id == id);
            output_success(
                &output_format,
                &format!("Job {} {} requested", id, action.as_str()),
                Some(json!({ "job": job })),
            )
        }
        SchedulerCommands::Enable => set_enabled(&console, true, &output_format).await,
        SchedulerCommands::Disable => set_enabled(&console, false, &output_format).await,
        SchedulerCommands::Phases => {
            let phases: Vec<_> = WORKFLOW_PHASES
                .iter()
                .map(|p| json!({ "key": p.key, "name": p.name, "description": p.description }))
                .collect();
            output_value(&output_format, &json!(phases))
        }
    }
}

async fn set_enabled(console: &SchedulerConsole, enable: bool, output_format: &OutputFormat) -> anyhow::Result<()> {
    console.set_enabled(enable).await?;
    let running = console.snapshot().status.running;
    output_success(
        output_format,
        if enable { "Scheduler enabled" } else { "Scheduler disabled" },
        Some(json!({ "running": running })),
    )
}
