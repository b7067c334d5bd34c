//! API models

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque task parameters, keyed by name
pub type TaskParams = serde_json::Map<String, serde_json::Value>;

/// A registered automation device as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub user_key: String,
    /// Stable identifier, unique within a user's device set
    pub device_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Free-form liveness status, e.g. "online" or "offline"
    pub status: String,
    #[serde(default)]
    pub agent_version: Option<String>,
    #[serde(default)]
    pub last_seen_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Whether no further transitions are expected for this snapshot
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Running => "Running",
            TaskStatus::Succeeded => "Succeeded",
            TaskStatus::Failed => "Failed",
            TaskStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dispatched command and its execution record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub task_uuid: Uuid,
    pub user_key: String,
    pub device_identifier: String,
    /// Command tag, e.g. "LinkStart" or "Fight"
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub payload: TaskParams,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: i32,
    pub created_at: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub log: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Task creation request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCreate {
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub params: TaskParams,
    #[serde(default)]
    pub priority: i32,
}

impl TaskCreate {
    /// Create a request with empty params and default priority
    pub fn new(task_type: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            params: TaskParams::new(),
            priority: 0,
        }
    }

    pub fn with_params(mut self, params: TaskParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
