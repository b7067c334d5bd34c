//! Scripted [`DeviceApi`] implementation for controller tests.
//!
//! - Responses are set per endpoint and per device
//! - Failures are injected one call at a time
//! - A gate holds a call in flight until the test releases it
//! - Every call is recorded, before any gate is awaited

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use maa_models::{Device, Task, TaskCreate, TaskParams, TaskStatus};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::errors::ConsoleError;
use crate::http::api::DeviceApi;

/// A recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    FetchDevices {
        user_key: Option<String>,
    },
    FetchTasks {
        device_id: String,
        user_key: String,
        limit: u32,
    },
    CreateTask {
        device_id: String,
        user_key: String,
        request: TaskCreate,
    },
}

#[derive(Default)]
pub struct MockApi {
    devices: Mutex<Vec<Device>>,
    tasks: Mutex<HashMap<String, Vec<Task>>>,
    devices_failure: Mutex<Option<ConsoleError>>,
    tasks_failure: Mutex<Option<ConsoleError>>,
    create_failure: Mutex<Option<ConsoleError>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<ApiCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_devices(&self, devices: Vec<Device>) {
        *lock(&self.devices) = devices;
    }

    pub fn set_tasks(&self, device_id: &str, tasks: Vec<Task>) {
        lock(&self.tasks).insert(device_id.to_string(), tasks);
    }

    pub fn fail_next_devices(&self, err: ConsoleError) {
        *lock(&self.devices_failure) = Some(err);
    }

    pub fn fail_next_tasks(&self, err: ConsoleError) {
        *lock(&self.tasks_failure) = Some(err);
    }

    pub fn fail_next_create(&self, err: ConsoleError) {
        *lock(&self.create_failure) = Some(err);
    }

    /// Hold the next call with `key` ("devices", "tasks:<id>", "create")
    /// until the returned sender fires.
    pub fn gate(&self, key: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        lock(&self.gates).insert(key.to_string(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        lock(&self.calls).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Device ids of every task fetch, in call order
    pub fn task_fetches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::FetchTasks { device_id, .. } => Some(device_id),
                _ => None,
            })
            .collect()
    }

    async fn enter(&self, key: &str, call: ApiCall) {
        lock(&self.calls).push(call);
        let gate = lock(&self.gates).remove(key);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }
}

#[async_trait]
impl DeviceApi for MockApi {
    async fn fetch_devices(&self, user_key: Option<&str>) -> Result<Vec<Device>, ConsoleError> {
        let call = ApiCall::FetchDevices {
            user_key: user_key.map(str::to_string),
        };
        self.enter("devices", call).await;

        if let Some(err) = lock(&self.devices_failure).take() {
            return Err(err);
        }
        Ok(lock(&self.devices).clone())
    }

    async fn fetch_device_tasks(
        &self,
        device_id: &str,
        user_key: &str,
        limit: u32,
    ) -> Result<Vec<Task>, ConsoleError> {
        let call = ApiCall::FetchTasks {
            device_id: device_id.to_string(),
            user_key: user_key.to_string(),
            limit,
        };
        self.enter(&format!("tasks:{}", device_id), call).await;

        if let Some(err) = lock(&self.tasks_failure).take() {
            return Err(err);
        }
        let tasks = lock(&self.tasks).get(device_id).cloned().unwrap_or_default();
        Ok(tasks.into_iter().take(limit as usize).collect())
    }

    async fn create_task_for_device(
        &self,
        device_id: &str,
        user_key: &str,
        request: &TaskCreate,
    ) -> Result<Task, ConsoleError> {
        let call = ApiCall::CreateTask {
            device_id: device_id.to_string(),
            user_key: user_key.to_string(),
            request: request.clone(),
        };
        self.enter("create", call).await;

        if let Some(err) = lock(&self.create_failure).take() {
            return Err(err);
        }

        let mut created = task(device_id, TaskStatus::Pending);
        created.task_type = request.task_type.clone();
        created.payload = request.params.clone();
        created.priority = request.priority;
        lock(&self.tasks)
            .entry(device_id.to_string())
            .or_default()
            .insert(0, created.clone());
        Ok(created)
    }
}

/// A minimal online device
pub fn device(device_id: &str) -> Device {
    Device {
        id: 1,
        user_key: "demo-user".to_string(),
        device_id: device_id.to_string(),
        display_name: None,
        status: "online".to_string(),
        agent_version: Some("0.1.0".to_string()),
        last_seen_at: Some("2025-01-01T12:00:00+00:00".to_string()),
        created_at: "2025-01-01T00:00:00+00:00".to_string(),
        updated_at: "2025-01-01T12:00:00+00:00".to_string(),
    }
}

/// A `LinkStart` task for `device_id` in `status`
pub fn task(device_id: &str, status: TaskStatus) -> Task {
    Task {
        id: 1,
        task_uuid: Uuid::new_v4(),
        user_key: "demo-user".to_string(),
        device_identifier: device_id.to_string(),
        task_type: "LinkStart".to_string(),
        payload: TaskParams::new(),
        status,
        priority: 0,
        created_at: "2025-01-01T12:00:00+00:00".to_string(),
        started_at: None,
        finished_at: None,
        log: None,
        error_message: None,
    }
}
