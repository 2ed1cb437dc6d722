//! HTTP client collaborator.
//!
//! Higher layers that call plain HTTP services instead of the RPC transport use
//! [`RestClient`]: a `reqwest` client built once from [`HttpClientConfig`]
//! (bounded pool, idle timeout, gzip, request timeout, bounded response body)
//! plus JSON, form, and GET helpers that report failures with the same
//! [`model::DomainError`] taxonomy the completion bridge uses.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection pooling, compression, and timeouts live here
//! and are construction-time parameters only.

pub mod client;
pub mod config;
pub mod errors;

pub use client::{status_error, RestClient, RestResponse};
pub use config::HttpClientConfig;
pub use errors::HttpClientError;
