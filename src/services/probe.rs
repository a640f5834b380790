use crate::domain::models::DeploymentTarget;
use crate::error::EnvironmentError;
use crate::services::storage;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Minimum supported interpreter, as (major, minor).
pub const PYTHON_FLOOR: (u32, u32) = (3, 10);

/// Resolve the interpreter the provisioning run will use. The
/// STEWARD_PYTHON override takes precedence over `python3` on PATH.
pub fn resolve_python() -> PathBuf {
    match std::env::var("STEWARD_PYTHON") {
        Ok(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from("python3"),
    }
}

/// Read-only host inspection. Fails fast on unmet prerequisites and
/// performs no mutation, so an aborted run leaves nothing behind.
pub fn probe(root: &Path, production: bool) -> Result<DeploymentTarget, EnvironmentError> {
    let python = resolve_python();
    let output = Command::new(&python)
        .arg("--version")
        .output()
        .map_err(|_| EnvironmentError::MissingTool(python.display().to_string()))?;
    if !output.status.success() {
        return Err(EnvironmentError::MissingTool(python.display().to_string()));
    }
    let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let raw = if raw.is_empty() {
        String::from_utf8_lossy(&output.stderr).trim().to_string()
    } else {
        raw
    };
    let (major, minor, patch) =
        parse_python_version(&raw).ok_or_else(|| EnvironmentError::UnparsableVersion(raw.clone()))?;
    if (major, minor) < PYTHON_FLOOR {
        return Err(EnvironmentError::VersionTooOld {
            required: format!("{}.{}", PYTHON_FLOOR.0, PYTHON_FLOOR.1),
            found: format!("{major}.{minor}.{patch}"),
        });
    }

    let privileged = effective_uid().map(|uid| uid == 0).unwrap_or(false);
    if production && !privileged {
        return Err(EnvironmentError::InsufficientPrivilege(
            "production provisioning",
        ));
    }

    let pip_available = Command::new(&python)
        .args(["-m", "pip", "--version"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);

    Ok(DeploymentTarget {
        python: python.display().to_string(),
        python_version: format!("{major}.{minor}.{patch}"),
        os: std::env::consts::OS.to_string(),
        privileged,
        pip_available,
        existing_install: storage::config_path(root).exists(),
    })
}

/// Parse "Python 3.11.4" style output into (major, minor, patch).
pub fn parse_python_version(raw: &str) -> Option<(u32, u32, u32)> {
    let version = raw
        .split_whitespace()
        .find(|tok| tok.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false))?;
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts
        .next()
        .map(|p| {
            p.chars()
                .take_while(|c| c.is_ascii_digit())
                .collect::<String>()
        })
        .and_then(|p| p.parse().ok())
        .unwrap_or(0);
    Some((major, minor, patch))
}

fn effective_uid() -> Option<u32> {
    // Linux is the deployment target; elsewhere fall through to None and
    // treat the host as unprivileged.
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("Uid:") {
            return rest.split_whitespace().next()?.parse().ok();
        }
    }
    None
}
