//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `provision.rs` — probe/init/install plus the composed `up` pipeline.
//! - `model.rs` — catalog listing, selection, and download.
//! - `deploy.rs` — service registration and the health check.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate stage logic to `services/*`.
//! - Wrap stage errors in `BootstrapError` so `main` can name the stage
//!   and pick the exit code.

pub mod deploy;
pub mod model;
pub mod provision;
