use clap::Subcommand;
use serde_json::{json, Value};

use crate::api::DashboardApi;
use crate::cli::utils::output_value;
use crate::cli::{ConsoleContext, OutputFormat};

#[derive(Subcommand)]
pub enum DashboardCommands {
    #[command(about = "Headline figures")]
    Summary {
        #[arg(long, help = "Look-back window in days")]
        days: Option<u32>,
    },

    #[command(about = "Sync job state")]
    Sync,
}

pub async fn handle(cmd: DashboardCommands, ctx: &ConsoleContext, output_format: OutputFormat) -> anyhow::Result<()> {
    ctx.require_session()?;
    let api = DashboardApi::new(ctx.client.clone());

    match cmd {
        DashboardCommands::Summary { days } => {
            let params = days.map(|days| json!({ "days": days })).unwrap_or(Value::Null);
            let data = api.summary(params).await?;
            output_value(&output_format, &data)
        }
        DashboardCommands::Sync => {
            let data = api.sync_status().await?;
            output_value(&output_format, &data)
        }
    }
}
