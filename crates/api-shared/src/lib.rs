//! # API Shared
//!
//! Wire types and shared services for the Personal Vault HTTP API.
//!
//! Contains:
//! - Request and response bodies (`models`), with OpenAPI schemas
//! - The agent-facing flat response and error codes (`agent`)
//! - `HealthService`
//!
//! Core types stay free of HTTP concerns; this crate converts them into what goes on the
//! wire.

pub mod agent;
pub mod health;
pub mod models;

pub use agent::{AgentComplianceRes, AgentError, AgentErrorCode, AgentErrorRes, AgentEvidence};
pub use health::HealthService;
pub use models::*;
