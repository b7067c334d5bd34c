//! Trait abstraction over the backend domain operations.
//!
//! The session controller is generic over [`DeviceApi`] so it can run
//! against [`HttpClient`] in production and a scripted mock in tests.

use async_trait::async_trait;
use maa_models::{Device, Task, TaskCreate};

use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// List devices, optionally scoped to a user key
    async fn fetch_devices(&self, user_key: Option<&str>) -> Result<Vec<Device>, ConsoleError>;

    /// List up to `limit` recent tasks of a device, newest first
    async fn fetch_device_tasks(
        &self,
        device_id: &str,
        user_key: &str,
        limit: u32,
    ) -> Result<Vec<Task>, ConsoleError>;

    /// Create a task for a device
    async fn create_task_for_device(
        &self,
        device_id: &str,
        user_key: &str,
        request: &TaskCreate,
    ) -> Result<Task, ConsoleError>;
}

#[async_trait]
impl DeviceApi for HttpClient {
    async fn fetch_devices(&self, user_key: Option<&str>) -> Result<Vec<Device>, ConsoleError> {
        HttpClient::fetch_devices(self, user_key).await
    }

    async fn fetch_device_tasks(
        &self,
        device_id: &str,
        user_key: &str,
        limit: u32,
    ) -> Result<Vec<Task>, ConsoleError> {
        HttpClient::fetch_device_tasks(self, device_id, user_key, limit).await
    }

    async fn create_task_for_device(
        &self,
        device_id: &str,
        user_key: &str,
        request: &TaskCreate,
    ) -> Result<Task, ConsoleError> {
        HttpClient::create_task_for_device(self, device_id, user_key, request).await
    }
}
