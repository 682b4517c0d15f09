use clap::Subcommand;
use serde_json::json;

use crate::auth::AuthService;
use crate::cli::utils::{output_success, output_value, prompt_password};
use crate::cli::{ConsoleContext, OutputFormat};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the backend and store the session")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and clear the stored session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show the cached user profile")]
    Whoami,

    #[command(about = "Check the stored token with the backend and refresh the profile")]
    Verify,
}

pub async fn handle(cmd: AuthCommands, ctx: &ConsoleContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let auth = AuthService::new(ctx.client.clone());

    match cmd {
        AuthCommands::Login { username, password } => {
            let password = prompt_password(password)?;
            let user = auth.login(&username, &password).await?;
            output_success(
                &output_format,
                &format!("Logged in as {} ({})", user.label(), user.role_or_guest()),
                Some(json!({ "user": user })),
            )
        }
        AuthCommands::Logout => {
            auth.logout().await;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let user = ctx.gate.current_user();
            let status = json!({
                "logged_in": ctx.gate.is_logged_in(),
                "admin": ctx.gate.is_admin(),
                "role": ctx.gate.user_role(),
                "user": user.as_ref().map(|u| u.label().to_string()),
                "api": ctx.config.api.base_url,
            });
            output_value(&output_format, &status)
        }
        AuthCommands::Whoami => {
            ctx.require_session()?;
            let user = ctx.gate.current_user().unwrap_or_default();
            output_value(&output_format, &serde_json::to_value(&user)?)
        }
        AuthCommands::Verify => {
            ctx.require_session()?;
            let user = auth.verify().await?;
            output_success(
                &output_format,
                &format!("Session valid for {}", user.label()),
                Some(json!({ "user": user })),
            )
        }
    }
}
