//! Shared plumbing for the Second Opinion backend: tracing setup, health
//! handlers, env-based configuration, request-id middleware and serde helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
