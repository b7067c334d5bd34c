//! MAA Console Library
//!
//! Keeps a local view of remote automation devices and their tasks in sync
//! with the MAA backend and dispatches operator commands.

pub mod errors;
pub mod http;
pub mod logs;
pub mod settings;
pub mod sync;
pub mod utils;
pub mod view;
pub mod workers;

pub use errors::ConsoleError;
pub use http::{DeviceApi, HttpClient};
pub use sync::{Command, SessionController, SessionOptions, SessionState};
