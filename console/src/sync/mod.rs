//! Device and task synchronization

pub mod command;
pub mod selection;
pub mod session;

#[cfg(test)]
pub(crate) mod mock;

pub use command::Command;
pub use session::{SessionController, SessionOptions, SessionState};
