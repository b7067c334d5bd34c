//! Task API client

use maa_models::{Task, TaskCreate};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::form_urlencoded;

use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

/// Default number of tasks returned per device
pub const DEFAULT_TASK_LIMIT: u32 = 20;

/// Largest page the backend accepts
pub const MAX_TASK_LIMIT: u32 = 100;

/// Characters left unescaped in a path segment, matching `encodeURIComponent`
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Build `/api/devices/{device_id}/tasks` with an encoded id and query
pub(crate) fn device_tasks_path(device_id: &str, query: &[(&str, &str)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query)
        .finish();
    format!(
        "/api/devices/{}/tasks?{}",
        utf8_percent_encode(device_id, PATH_SEGMENT),
        query
    )
}

impl HttpClient {
    /// List the most recent tasks of a device, newest first
    pub async fn fetch_device_tasks(
        &self,
        device_id: &str,
        user_key: &str,
        limit: u32,
    ) -> Result<Vec<Task>, ConsoleError> {
        if !(1..=MAX_TASK_LIMIT).contains(&limit) {
            return Err(ConsoleError::ValidationError(format!(
                "task limit must be between 1 and {}, got {}",
                MAX_TASK_LIMIT, limit
            )));
        }

        let limit = limit.to_string();
        let path = device_tasks_path(device_id, &[("user", user_key), ("limit", &limit)]);
        let tasks: Option<Vec<Task>> = self.get(&path).await?;
        Ok(tasks.unwrap_or_default())
    }

    /// Queue a new task for a device.
    ///
    /// The returned snapshot is freshly created; its status has not settled.
    pub async fn create_task_for_device(
        &self,
        device_id: &str,
        user_key: &str,
        request: &TaskCreate,
    ) -> Result<Task, ConsoleError> {
        validate_task_create(request)?;

        let path = device_tasks_path(device_id, &[("user", user_key)]);
        let task: Option<Task> = self.post(&path, request).await?;
        task.ok_or_else(|| ConsoleError::Internal("task creation returned no content".to_string()))
    }
}

fn validate_task_create(request: &TaskCreate) -> Result<(), ConsoleError> {
    if request.task_type.trim().is_empty() {
        return Err(ConsoleError::ValidationError(
            "task type must not be empty".to_string(),
        ));
    }
    if request.priority < 0 {
        return Err(ConsoleError::ValidationError(format!(
            "task priority must not be negative, got {}",
            request.priority
        )));
    }
    Ok(())
}
