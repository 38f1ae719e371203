//! HTTP gateway to the Benchtop REST API.
//!
//! One [`ApiClient`] performs exactly one network operation per method and
//! returns either the decoded aggregate/collection or a [`RemoteError`].
//! Callers (the domain services) treat every failure identically — any
//! error means "fall back to the local cache" — so the error carries
//! detail for logging only, never for branching.

pub mod client;
pub mod config;
pub mod error;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::{RemoteError, RemoteResult};
