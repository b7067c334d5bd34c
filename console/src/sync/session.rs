//! Device and task synchronization for one operator session

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use maa_models::{Device, Task};
use tracing::{debug, info, warn};

use crate::errors::ConsoleError;
use crate::http::api::DeviceApi;
use crate::settings::Settings;
use crate::sync::command::Command;
use crate::sync::selection::reconcile_selection;

pub const LOAD_DEVICES_FAILED: &str = "failed to load devices";
pub const LOAD_TASKS_FAILED: &str = "failed to load tasks";
pub const DISPATCH_FAILED: &str = "failed to dispatch task";
pub const DISPATCH_BUSY: &str = "a command is already being dispatched";

/// Session options
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// User key scoping every request
    pub user_key: String,

    /// Tasks fetched per refresh
    pub task_page_size: u32,
}

impl From<&Settings> for SessionOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            user_key: settings.backend.user_key.clone(),
            task_page_size: settings.task_page_size,
        }
    }
}

/// Snapshot of everything the console renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub devices: Vec<Device>,
    pub selected_device_id: Option<String>,
    /// Tasks of the selected device, newest first as returned by the backend
    pub tasks: Vec<Task>,
    pub devices_loading: bool,
    pub tasks_loading: bool,
    pub action_loading: bool,
    pub last_error: Option<String>,
    /// Operator's pending stage input for `run_stage`
    pub stage_input: String,
}

impl SessionState {
    pub fn selected_device(&self) -> Option<&Device> {
        let selected = self.selected_device_id.as_deref()?;
        self.devices.iter().find(|d| d.device_id == selected)
    }
}

struct Inner {
    state: SessionState,
    /// Bumped on every device refresh start
    devices_generation: u64,
    /// Bumped on every task refresh start and every selection change
    tasks_generation: u64,
}

impl Inner {
    fn select(&mut self, device_id: Option<String>) {
        self.state.selected_device_id = device_id;
        self.tasks_generation += 1;
        if self.state.selected_device_id.is_none() {
            self.state.tasks.clear();
            self.state.tasks_loading = false;
        }
    }

    fn begin_tasks_refresh(&mut self) -> u64 {
        self.tasks_generation += 1;
        self.state.tasks_loading = true;
        self.state.last_error = None;
        self.tasks_generation
    }
}

/// Keeps the local view of devices, selection and tasks consistent with the
/// backend and turns operator intents into tasks.
///
/// Every operation takes `&self` and may overlap with others. Results of a
/// refresh that was superseded while in flight are discarded.
pub struct SessionController<A> {
    api: A,
    options: SessionOptions,
    inner: RwLock<Inner>,
}

impl<A: DeviceApi> SessionController<A> {
    pub fn new(api: A, options: SessionOptions) -> Self {
        Self {
            api,
            options,
            inner: RwLock::new(Inner {
                state: SessionState::default(),
                devices_generation: 0,
                tasks_generation: 0,
            }),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Current state
    pub fn snapshot(&self) -> SessionState {
        self.read().state.clone()
    }

    pub fn set_stage_input(&self, input: impl Into<String>) {
        self.write().state.stage_input = input.into();
    }

    /// Replace the device set and reconcile the selection.
    ///
    /// A selection change triggers one task refresh for the new selection.
    pub async fn refresh_devices(&self) -> Result<(), ConsoleError> {
        self.refresh_devices_and_selection().await.map(|_| ())
    }

    /// One polling cycle: devices, then tasks unless the device refresh
    /// already fetched them for a new selection.
    pub async fn sync(&self) -> Result<(), ConsoleError> {
        let tasks_refreshed = self.refresh_devices_and_selection().await?;
        if !tasks_refreshed {
            self.refresh_tasks().await?;
        }
        Ok(())
    }

    /// Returns whether the selection changed and tasks were refreshed
    async fn refresh_devices_and_selection(&self) -> Result<bool, ConsoleError> {
        let ticket = {
            let mut inner = self.write();
            inner.devices_generation += 1;
            inner.state.devices_loading = true;
            inner.state.last_error = None;
            inner.devices_generation
        };

        let result = self.api.fetch_devices(Some(&self.options.user_key)).await;

        let selection_changed = {
            let mut inner = self.write();
            if ticket != inner.devices_generation {
                debug!("Discarding stale device refresh #{}", ticket);
                return Ok(false);
            }
            inner.state.devices_loading = false;

            let devices = match result {
                Ok(devices) => devices,
                Err(e) => {
                    warn!("Device refresh failed: {}", e);
                    inner.state.last_error = Some(e.user_message(LOAD_DEVICES_FAILED));
                    return Err(e);
                }
            };

            let previous = inner.state.selected_device_id.clone();
            let next = reconcile_selection(previous.as_deref(), &devices);
            info!("Loaded {} devices, selected {:?}", devices.len(), next);
            inner.state.devices = devices;

            let changed = next != previous;
            if changed {
                debug!("Selection changed from {:?} to {:?}", previous, next);
                inner.select(next);
            }
            changed
        };

        if selection_changed {
            if let Err(e) = self.refresh_tasks().await {
                debug!("Task refresh after selection change failed: {}", e);
            }
        }
        Ok(selection_changed)
    }

    /// Reload the task list of the selected device
    pub async fn refresh_tasks(&self) -> Result<(), ConsoleError> {
        let (device_id, ticket) = {
            let mut inner = self.write();
            let Some(device_id) = inner.state.selected_device_id.clone() else {
                inner.state.tasks.clear();
                return Ok(());
            };
            (device_id, inner.begin_tasks_refresh())
        };
        self.fetch_tasks(&device_id, ticket).await
    }

    async fn fetch_tasks(&self, device_id: &str, ticket: u64) -> Result<(), ConsoleError> {
        let result = self
            .api
            .fetch_device_tasks(device_id, &self.options.user_key, self.options.task_page_size)
            .await;

        let mut inner = self.write();
        if ticket != inner.tasks_generation {
            debug!("Discarding stale task refresh #{} for {}", ticket, device_id);
            return Ok(());
        }
        inner.state.tasks_loading = false;

        match result {
            Ok(tasks) => {
                debug!("Loaded {} tasks for {}", tasks.len(), device_id);
                inner.state.tasks = tasks;
                Ok(())
            }
            Err(e) => {
                warn!("Task refresh for {} failed: {}", device_id, e);
                inner.state.last_error = Some(e.user_message(LOAD_TASKS_FAILED));
                Err(e)
            }
        }
    }

    /// Focus a known device; a change reloads its tasks
    pub async fn select_device(&self, device_id: &str) -> Result<(), ConsoleError> {
        let changed = {
            let mut inner = self.write();
            if !inner.state.devices.iter().any(|d| d.device_id == device_id) {
                let err = ConsoleError::ValidationError(format!("unknown device: {}", device_id));
                inner.state.last_error = Some(err.user_message(LOAD_TASKS_FAILED));
                return Err(err);
            }
            let changed = inner.state.selected_device_id.as_deref() != Some(device_id);
            if changed {
                inner.select(Some(device_id.to_string()));
            }
            changed
        };

        if changed {
            self.refresh_tasks().await?;
        }
        Ok(())
    }

    /// Create a task on the selected device.
    ///
    /// Returns `Ok(None)` without a request when nothing is selected. A
    /// successful dispatch reloads the device's tasks before returning.
    pub async fn dispatch(&self, command: Command) -> Result<Option<Task>, ConsoleError> {
        let device_id = {
            let mut inner = self.write();
            let Some(device_id) = inner.state.selected_device_id.clone() else {
                debug!("No device selected, ignoring {}", command.task_type());
                return Ok(None);
            };
            if inner.state.action_loading {
                let err = ConsoleError::ValidationError(DISPATCH_BUSY.to_string());
                inner.state.last_error = Some(err.user_message(DISPATCH_FAILED));
                return Err(err);
            }
            inner.state.action_loading = true;
            inner.state.last_error = None;
            device_id
        };

        let request = command.into_task_create();
        let result = self
            .api
            .create_task_for_device(&device_id, &self.options.user_key, &request)
            .await;

        let outcome = match result {
            Ok(task) => {
                info!(
                    "Dispatched {} to {} as task {}",
                    task.task_type, device_id, task.task_uuid
                );
                self.refresh_tasks_after_dispatch(&device_id).await;
                Ok(Some(task))
            }
            Err(e) => {
                warn!("Dispatching {} to {} failed: {}", request.task_type, device_id, e);
                self.write().state.last_error = Some(e.user_message(DISPATCH_FAILED));
                Err(e)
            }
        };

        self.write().state.action_loading = false;
        outcome
    }

    async fn refresh_tasks_after_dispatch(&self, device_id: &str) {
        let ticket = {
            let mut inner = self.write();
            if inner.state.selected_device_id.as_deref() != Some(device_id) {
                debug!("Selection moved away from {}, skipping task refresh", device_id);
                return;
            }
            inner.begin_tasks_refresh()
        };
        if let Err(e) = self.fetch_tasks(device_id, ticket).await {
            debug!("Task refresh after dispatch failed: {}", e);
        }
    }

    /// Dispatch the default routine
    pub async fn start_default_routine(&self) -> Result<Option<Task>, ConsoleError> {
        self.dispatch(Command::LinkStart).await
    }

    /// Dispatch a `Fight` for the stage in the stage input.
    ///
    /// Blank input fails before any request. The input is cleared once the
    /// task has been created.
    pub async fn run_stage(&self) -> Result<Option<Task>, ConsoleError> {
        let input = self.read().state.stage_input.clone();
        let command = match Command::fight(&input) {
            Ok(command) => command,
            Err(e) => {
                self.write().state.last_error = Some(e.user_message(DISPATCH_FAILED));
                return Err(e);
            }
        };

        let task = self.dispatch(command).await?;
        if task.is_some() {
            self.write().state.stage_input.clear();
        }
        Ok(task)
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
