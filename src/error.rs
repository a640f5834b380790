//! Stage error taxonomy.
//!
//! Every provisioning stage has its own error enum; `BootstrapError`
//! aggregates them so `main` can name the failing stage, pick a distinct
//! exit code, and print a remediation hint. Errors travel through
//! `anyhow::Result` plumbing wrapped in `BootstrapError`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("required tool not found: {0}")]
    MissingTool(String),
    #[error("python {found} is too old ({required}+ required)")]
    VersionTooOld { required: String, found: String },
    #[error("could not parse interpreter version from {0:?}")]
    UnparsableVersion(String),
    #[error("root privileges are required for {0}")]
    InsufficientPrivilege(&'static str),
}

#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("config not found at {0}")]
    MissingConfig(PathBuf),
    #[error("invalid config {path}: {source}")]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("{tool} exited with {status}: {output}")]
    ToolFailure {
        tool: String,
        status: String,
        output: String,
    },
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("invalid choice {given:?}: expected a number between 1 and {max}")]
    InvalidChoice { given: String, max: usize },
    #[error("no selection provided")]
    NoInput,
    #[error("catalog is empty")]
    EmptyCatalog,
    #[error("duplicate catalog id: {0}")]
    DuplicateId(u32),
    #[error("duplicate catalog filename: {0}")]
    DuplicateFilename(String),
    #[error("unreadable catalog {path}: {detail}")]
    UnreadableCatalog { path: PathBuf, detail: String },
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("download produced an empty file")]
    Empty,
    #[error("checksum mismatch: expected {expected}, got {found}")]
    ChecksumMismatch { expected: String, found: String },
}

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("unsafe {field} value {value:?}: shell metacharacters are not allowed")]
    UnsafeValue { field: &'static str, value: String },
    #[error("{tool} exited with {status}")]
    CommandFailed { tool: String, status: String },
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("health check failed after {attempts} attempts: {url}: {detail}")]
    HealthCheckFailed {
        url: String,
        attempts: u32,
        detail: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
    #[error(transparent)]
    Materialize(#[from] MaterializeError),
    #[error(transparent)]
    Install(#[from] InstallError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Deploy(#[from] DeployError),
}

impl BootstrapError {
    pub fn stage(&self) -> &'static str {
        match self {
            BootstrapError::Environment(_) => "probe",
            BootstrapError::Materialize(_) => "init",
            BootstrapError::Install(_) => "install",
            BootstrapError::Selection(_) => "model selection",
            BootstrapError::Download(_) => "model download",
            BootstrapError::Deploy(_) => "deploy",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            BootstrapError::Environment(_) => 2,
            BootstrapError::Materialize(_) => 3,
            BootstrapError::Install(_) => 4,
            BootstrapError::Selection(_) => 5,
            BootstrapError::Download(_) => 6,
            BootstrapError::Deploy(_) => 7,
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            BootstrapError::Environment(_) => {
                "remediate the host (install python 3.10+, or re-run with sudo for production) and run `steward probe` again"
            }
            BootstrapError::Materialize(_) => {
                "check filesystem permissions and free space, then re-run `steward init`"
            }
            BootstrapError::Install(_) => {
                "inspect the tool output above, then re-run `steward install` (safe to repeat)"
            }
            BootstrapError::Selection(_) => "run `steward model list` and pick a listed ordinal",
            BootstrapError::Download(_) => {
                "check connectivity and re-run `steward model fetch <selector>`; interrupted transfers restart cleanly"
            }
            BootstrapError::Deploy(_) => {
                "fix the reported service issue and re-run `steward deploy`; the run is not successful until the health check passes"
            }
        }
    }
}
