//! Plain-text rendering of a session snapshot

use std::fmt::Write;

use chrono::{DateTime, Local, NaiveDateTime};
use colored::{ColoredString, Colorize};
use maa_models::{Device, Task, TaskStatus};

use crate::sync::session::SessionState;

/// Characters of a task log shown in the task list
pub const LOG_TAIL_CHARS: usize = 400;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Display name, falling back to the device id
pub fn device_label(device: &Device) -> &str {
    device
        .display_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(&device.device_id)
}

/// Format a backend timestamp in local time.
///
/// Values that do not parse are returned unchanged.
pub fn format_timestamp(value: Option<&str>) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.format(TIMESTAMP_FORMAT).to_string());
    }
    Some(value.to_string())
}

/// Last `max_chars` characters of `log`
pub fn log_tail(log: &str, max_chars: usize) -> &str {
    let count = log.chars().count();
    if count <= max_chars {
        return log;
    }
    match log.char_indices().nth(count - max_chars) {
        Some((idx, _)) => &log[idx..],
        None => log,
    }
}

/// Time of the latest status change we know of
pub fn task_updated_at(task: &Task) -> Option<&str> {
    task.finished_at.as_deref().or(task.started_at.as_deref())
}

pub fn status_label(status: TaskStatus) -> ColoredString {
    match status {
        TaskStatus::Pending => status.as_str().yellow(),
        TaskStatus::Running => status.as_str().cyan(),
        TaskStatus::Succeeded => status.as_str().green(),
        TaskStatus::Failed => status.as_str().red(),
        TaskStatus::Cancelled => status.as_str().dimmed(),
    }
}

fn device_status_label(status: &str) -> ColoredString {
    match status.to_lowercase().as_str() {
        "online" => status.green(),
        "offline" => status.dimmed(),
        _ => status.yellow(),
    }
}

/// Render the whole console view
pub fn render(state: &SessionState, user_key: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (user: {})", "MAA remote console".bold(), user_key);

    if let Some(error) = &state.last_error {
        let _ = writeln!(out, "{} {}", "error:".red().bold(), error);
    }

    let _ = writeln!(out, "\nDevices");
    if state.devices.is_empty() {
        let placeholder = if state.devices_loading { "loading..." } else { "no devices online" };
        let _ = writeln!(out, "  {}", placeholder.dimmed());
    }
    for device in &state.devices {
        let marker = if state.selected_device_id.as_deref() == Some(device.device_id.as_str()) {
            "*"
        } else {
            " "
        };
        let last_seen = format_timestamp(device.last_seen_at.as_deref())
            .unwrap_or_else(|| "never connected".to_string());
        let _ = writeln!(
            out,
            "{} {} [{}] last seen {}",
            marker,
            device_label(device),
            device_status_label(&device.status),
            last_seen
        );
    }

    let Some(selected) = state.selected_device() else {
        let _ = writeln!(out, "\n{}", "select a device to see its tasks".dimmed());
        return out;
    };

    let _ = writeln!(
        out,
        "\n{} (agent {}, id {})",
        device_label(selected).bold(),
        selected.agent_version.as_deref().unwrap_or("unknown"),
        selected.device_id
    );
    if state.action_loading {
        let _ = writeln!(out, "  {}", "dispatching...".yellow());
    }

    let _ = writeln!(out, "\nRecent tasks");
    if state.tasks.is_empty() {
        let placeholder = if state.tasks_loading { "loading..." } else { "no tasks yet" };
        let _ = writeln!(out, "  {}", placeholder.dimmed());
    }
    for task in &state.tasks {
        let created = format_timestamp(Some(task.created_at.as_str())).unwrap_or_default();
        let updated = format_timestamp(task_updated_at(task)).unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {} [{}] created {} updated {}",
            task.task_type,
            status_label(task.status),
            created,
            updated
        );
        match task.log.as_deref().filter(|log| !log.is_empty()) {
            Some(log) => {
                for line in log_tail(log, LOG_TAIL_CHARS).lines() {
                    let _ = writeln!(out, "    | {}", line);
                }
            }
            None => {
                let _ = writeln!(out, "    {}", "no log yet".dimmed());
            }
        }
        if let Some(error) = &task.error_message {
            let _ = writeln!(out, "    {} {}", "error:".red(), error);
        }
    }

    out
}
