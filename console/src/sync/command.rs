//! Operator intents that turn into backend tasks

use maa_models::{TaskCreate, TaskParams};
use serde_json::Value;

use crate::errors::ConsoleError;

pub const LINK_START: &str = "LinkStart";
pub const FIGHT: &str = "Fight";

/// Shown when the stage input is blank
pub const STAGE_REQUIRED: &str = "please enter a stage identifier";

/// A command the operator can dispatch to the selected device
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the device's default daily routine
    LinkStart,

    /// Farm a single stage
    Fight { stage: String },

    /// Any other task type
    Custom(TaskCreate),
}

impl Command {
    /// Build a `Fight` command from raw operator input
    pub fn fight(stage: &str) -> Result<Self, ConsoleError> {
        let stage = stage.trim();
        if stage.is_empty() {
            return Err(ConsoleError::ValidationError(STAGE_REQUIRED.to_string()));
        }
        Ok(Command::Fight {
            stage: stage.to_string(),
        })
    }

    pub fn task_type(&self) -> &str {
        match self {
            Command::LinkStart => LINK_START,
            Command::Fight { .. } => FIGHT,
            Command::Custom(request) => &request.task_type,
        }
    }

    pub fn into_task_create(self) -> TaskCreate {
        match self {
            Command::LinkStart => TaskCreate::new(LINK_START),
            Command::Fight { stage } => {
                let mut params = TaskParams::new();
                params.insert("stage".to_string(), Value::String(stage));
                TaskCreate::new(FIGHT).with_params(params)
            }
            Command::Custom(request) => request,
        }
    }
}
