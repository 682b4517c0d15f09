use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_value;
use crate::cli::{ConsoleContext, OutputFormat};

#[derive(Subcommand)]
pub enum RouteCommands {
    #[command(about = "Show where navigating to a console path lands with the current session")]
    Check {
        #[arg(help = "Console path, e.g. /settings")]
        path: String,
    },

    #[command(about = "List console routes and their access rules")]
    List,
}

pub fn handle(cmd: RouteCommands, ctx: &ConsoleContext, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        RouteCommands::Check { path } => {
            let nav = ctx.router.navigate(&path)?;
            let redirects: Vec<String> = nav
                .redirects
                .iter()
                .map(|(from, to)| format!("{} -> {}", from, to))
                .collect();

            output_value(
                &output_format,
                &json!({
                    "requested": nav.requested,
                    "location": nav.location,
                    "route": nav.route_name,
                    "title": ctx.router.title(),
                    "redirects": redirects,
                }),
            )
        }
        RouteCommands::List => {
            let table = ctx.router.table();
            if output_format == OutputFormat::Text {
                for route in table.routes() {
                    let access = match (route.redirect, route.meta.requires_admin, route.meta.requires_auth()) {
                        (Some(to), _, _) => format!("-> {}", to),
                        (None, true, _) => "admin".to_string(),
                        (None, false, true) => "login".to_string(),
                        (None, false, false) => "public".to_string(),
                    };
                    println!("{:<22} {:<8} {}", route.path, access, route.meta.title.unwrap_or(""));
                }
                return Ok(());
            }

            let routes: Vec<_> = table
                .routes()
                .iter()
                .map(|route| {
                    json!({
                        "path": route.path,
                        "name": route.name,
                        "title": route.meta.title,
                        "requires_auth": route.meta.requires_auth(),
                        "requires_admin": route.meta.requires_admin,
                        "redirect": route.redirect,
                    })
                })
                .collect();
            output_value(&output_format, &json!(routes))
        }
    }
}
