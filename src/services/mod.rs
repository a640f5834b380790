//! Service layer containing the provisioning stages and side-effect helpers.
//!
//! ## Service map
//! - `probe.rs` — read-only host inspection (interpreter, privilege, pip).
//! - `materialize.rs` — directory layout, config.yaml, .env, secret handling.
//! - `installer.rs` — pinned dependency install into the virtualenv.
//! - `fetch.rs` — streaming model download with staging + verification.
//! - `registrar.rs` — nginx/supervisor/firewall/certificate rendering.
//! - `health.rs` — post-deploy status endpoint check.
//! - `storage.rs` — install-root path helpers + audit log.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Stages are linear; each returns a typed report or a stage error.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod fetch;
pub mod health;
pub mod installer;
pub mod materialize;
pub mod output;
pub mod probe;
pub mod registrar;
pub mod storage;
