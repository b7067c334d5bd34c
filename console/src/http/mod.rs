//! Backend HTTP access: the transport and the typed domain operations

pub mod api;
pub mod client;
pub mod devices;
pub mod tasks;

pub use api::DeviceApi;
pub use client::{HttpClient, RequestOptions};
