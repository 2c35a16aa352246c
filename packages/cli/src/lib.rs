//! Terminal client for the course server.

pub mod client;
pub mod debounce;
pub mod render;
pub mod resource;
pub mod store;
pub mod table;

pub use client::{ApiClient, ClientError, ListQuery};
pub use store::Store;
