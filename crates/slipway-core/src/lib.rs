//! slipway-core - Core library for Slipway
//!
//! This crate provides the scaffolding and deployment lifecycle
//! orchestration shared by the slipway CLI and slipway-server:
//!
//! - **metadata**: durable per-project lifecycle records
//! - **conflict**: pre-creation conflict detection
//! - **generator**: project scaffolding and resource manifests
//! - **cluster** / **image** / **repohost**: typed clients for the external
//!   systems
//! - **provision**: ordered resource provisioning with readiness polling
//! - **progress**: the per-run event channel
//! - **teardown**: best-effort, partial-failure-tolerant cleanup
//! - **lifecycle**: the creation flow and per-identifier locking

pub mod cluster;
pub mod config;
pub mod conflict;
pub mod error;
pub mod generator;
pub mod image;
pub mod lifecycle;
pub mod metadata;
pub mod progress;
pub mod provision;
pub mod repohost;
pub mod teardown;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use metadata::MetadataStore;
pub use progress::ProgressEvent;
