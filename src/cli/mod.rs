pub mod commands;
pub mod context;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

pub use context::ConsoleContext;

#[derive(Parser)]
#[command(name = "qa-console")]
#[command(about = "Admin console for the AI Q&A quality pipeline")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, sign out and inspect the stored session")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Evaluate console navigation against the current session")]
    Route {
        #[command(subcommand)]
        cmd: commands::route::RouteCommands,
    },

    #[command(about = "Scheduler status, configuration and workflow control")]
    Scheduler {
        #[command(subcommand)]
        cmd: commands::scheduler::SchedulerCommands,
    },

    #[command(about = "Question listing and export")]
    Questions {
        #[command(subcommand)]
        cmd: commands::questions::QuestionsCommands,
    },

    #[command(about = "Badcase review queue")]
    Badcase {
        #[command(subcommand)]
        cmd: commands::badcase::BadcaseCommands,
    },

    #[command(about = "Dashboard figures")]
    Dashboard {
        #[command(subcommand)]
        cmd: commands::dashboard::DashboardCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let ctx = ConsoleContext::open()?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx, output_format).await,
        Commands::Route { cmd } => commands::route::handle(cmd, &ctx, output_format),
        Commands::Scheduler { cmd } => commands::scheduler::handle(cmd, &ctx, output_format).await,
        Commands::Questions { cmd } => commands::questions::handle(cmd, &ctx, output_format).await,
        Commands::Badcase { cmd } => commands::badcase::handle(cmd, &ctx, output_format).await,
        Commands::Dashboard { cmd } => commands::dashboard::handle(cmd, &ctx, output_format).await,
    }
}
