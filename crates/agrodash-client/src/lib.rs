//! Typed client for the agrodash REST backend.

pub mod client;
pub mod error;

mod wire;

pub use client::BackendClient;
pub use error::ClientError;
