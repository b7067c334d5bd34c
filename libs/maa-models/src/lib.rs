//! API models shared between the MAA console and its backend.

pub mod models;

pub use models::{Device, Task, TaskCreate, TaskParams, TaskStatus};
