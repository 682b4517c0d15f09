use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::api::QuestionsApi;
use crate::cli::utils::{extract_items, output_collection, output_success};
use crate::cli::{ConsoleContext, OutputFormat};

#[derive(Subcommand)]
pub enum QuestionsCommands {
    #[command(about = "List questions")]
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
        #[arg(long, help = "Filter by classification")]
        category: Option<String>,
        #[arg(long, help = "Search text")]
        keyword: Option<String>,
    },

    #[command(about = "Download the question export")]
    Export {
        #[arg(help = "File to write")]
        output: PathBuf,
        #[arg(long, help = "Filter by classification")]
        category: Option<String>,
    },
}

fn filters(category: Option<String>, keyword: Option<String>) -> Map<String, Value> {
    let mut params = Map::new();
    if let Some(category) = category {
        params.insert("category".to_string(), json!(category));
    }
    if let Some(keyword) = keyword {
        params.insert("keyword".to_string(), json!(keyword));
    }
    params
}

pub async fn handle(cmd: QuestionsCommands, ctx: &ConsoleContext, output_format: OutputFormat) -> anyhow::Result<()> {
    ctx.require_session()?;
    let api = QuestionsApi::new(ctx.client.clone());

    match cmd {
        QuestionsCommands::List {
            page,
            page_size,
            category,
            keyword,
        } => {
            let mut params = filters(category, keyword);
            params.insert("page".to_string(), json!(page));
            params.insert("page_size".to_string(), json!(page_size));

            let data = api.list(Value::Object(params)).await?;
            output_collection(&output_format, "questions", &extract_items(&data), "No questions found")
        }
        QuestionsCommands::Export { output, category } => {
            let raw = api.export(Value::Object(filters(category, None))).await?;
            if !raw.is_success() {
                anyhow::bail!("Export failed with status {}", raw.status);
            }

            std::fs::write(&output, &raw.body)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            output_success(
                &output_format,
                &format!("Exported {} bytes to {}", raw.body.len(), output.display()),
                Some(json!({
                    "path": output.display().to_string(),
                    "bytes": raw.body.len(),
                    "suggested_name": raw.file_name(),
                })),
            )
        }
    }
}
