use clap::Subcommand;
use serde_json::json;

use crate::api::BadcaseApi;
use crate::cli::utils::{extract_items, output_collection, output_value};
use crate::cli::{ConsoleContext, OutputFormat};

#[derive(Subcommand)]
pub enum BadcaseCommands {
    #[command(about = "List badcases awaiting review")]
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },

    #[command(about = "Badcase counts and rates")]
    Stats,
}

pub async fn handle(cmd: BadcaseCommands, ctx: &ConsoleContext, output_format: OutputFormat) -> anyhow::Result<()> {
    ctx.require_session()?;
    let api = BadcaseApi::new(ctx.client.clone());

    match cmd {
        BadcaseCommands::List { page, page_size } => {
            let data = api.list(json!({ "page": page, "page_size": page_size })).await?;
            output_collection(&output_format, "badcases", &extract_items(&data), "No badcases found")
        }
        BadcaseCommands::Stats => {
            let data = api.statistics(serde_json::Value::Null).await?;
            output_value(&output_format, &data)
        }
    }
}
