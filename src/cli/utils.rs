use std::io::{self, BufRead, Write};

use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;
use crate::scheduler::SchedulerView;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert("success".to_string(), json!(true));
            response.insert("message".to_string(), json!(message));

            match data {
                Some(Value::Object(fields)) => response.extend(fields),
                Some(other) => {
                    response.insert("data".to_string(), other);
                }
                None => {}
            }

            println!("{}", serde_json::to_string_pretty(&Value::Object(response))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output a backend payload: pretty JSON, or one `key: value` line per field
pub fn output_value(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => {
            for line in text_lines(value) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// Output a list payload, falling back to `message` when it is empty
pub fn output_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    items: &[Value],
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ collection_name: items }))?
            );
        }
        OutputFormat::Text if items.is_empty() => println!("{}", message),
        OutputFormat::Text => {
            for item in items {
                println!("- {}", summarize(item));
            }
        }
    }
    Ok(())
}

pub fn output_scheduler_view(output_format: &OutputFormat, view: &SchedulerView) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Text => {
            let status = &view.status;
            println!("Scheduler: {}", if status.running { "running" } else { "stopped" });
            println!("Last execution: {}", status.last_execution.as_deref().unwrap_or("-"));
            if let Some(now) = &status.current_time {
                println!("Server time: {}", now);
            }

            println!("Workflow phases:");
            for phase in &view.workflow_phases {
                let marker = if phase.enabled { ' ' } else { 'x' };
                println!("  [{}] {:<18} {:<8} {}", marker, phase.key, phase.status, phase.name);
            }

            println!("Jobs:");
            if view.jobs.is_empty() {
                println!("  (none)");
            }
            for job in &view.jobs {
                println!(
                    "  {:<24} next: {}",
                    job.id,
                    job.next_run_time.as_deref().unwrap_or("-")
                );
            }

            let config = &view.config;
            println!(
                "Config: enabled={} interval={}m batch={} min_batch={} auto_start={} auto_suspend={} data_check={}",
                config.scheduler_enabled,
                config.workflow_interval_minutes,
                config.batch_size,
                config.min_batch_size,
                config.auto_process_on_startup,
                config.auto_suspend_when_no_data,
                config.data_check_enabled,
            );
        }
    }
    Ok(())
}

/// Items of a paged payload, which the backend nests under varying keys
pub fn extract_items(data: &Value) -> Vec<Value> {
    if let Value::Array(items) = data {
        return items.clone();
    }
    ["items", "list", "data", "records"]
        .iter()
        .find_map(|key| data.get(*key).and_then(Value::as_array))
        .cloned()
        .unwrap_or_default()
}

/// Read a password from stdin when it was not passed as a flag
pub fn prompt_password(provided: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = provided {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(password)
}

fn text_lines(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{}: {}", key, scalar(value)))
            .collect(),
        Value::Array(items) => items.iter().map(|item| format!("- {}", summarize(item))).collect(),
        other => vec![scalar(other)],
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn summarize(item: &Value) -> String {
    let Value::Object(map) = item else {
        return scalar(item);
    };
    let id = map.get("id").map(scalar);
    let label = ["title", "question", "content", "name", "username"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str));

    match (id, label) {
        (Some(id), Some(label)) => format!("#{} {}", id, label),
        (Some(id), None) => format!("#{}", id),
        (None, Some(label)) => label.to_string(),
        (None, None) => item.to_string(),
    }
}
