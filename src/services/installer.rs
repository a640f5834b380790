use crate::domain::models::{InstallReport, PackageStatus};
use crate::error::InstallError;
use crate::services::{probe, storage};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

pub struct Pin {
    pub name: &'static str,
    pub version: &'static str,
}

/// Minimum set the server needs to boot.
pub const CORE_PINS: &[Pin] = &[
    Pin { name: "fastapi", version: "0.104.1" },
    Pin { name: "uvicorn[standard]", version: "0.24.0" },
    Pin { name: "pyyaml", version: "6.0.1" },
    Pin { name: "aiofiles", version: "23.2.1" },
];

/// Additions for voice and local inference.
pub const FULL_PINS: &[Pin] = &[
    Pin { name: "psutil", version: "5.9.6" },
    Pin { name: "aiohttp", version: "3.9.0" },
    Pin { name: "SpeechRecognition", version: "3.10.0" },
    Pin { name: "llama-cpp-python", version: "0.2.20" },
    Pin { name: "requests", version: "2.31.0" },
    Pin { name: "numpy", version: "1.24.3" },
    Pin { name: "pyttsx3", version: "2.90" },
];

/// Install the pinned set in order. Re-running against a satisfied
/// environment is a no-op at the tool level, so the whole stage is safe
/// to repeat. Each pin gets up to `retries` attempts with linear backoff
/// to ride out transient network failures.
pub fn install(root: &Path, full: bool, retries: u32) -> Result<InstallReport, InstallError> {
    let retries = retries.max(1);
    let python = interpreter(root)?;
    let mut packages = Vec::new();

    // pip upgrades are advisory; an old pip can still install the pins.
    let upgrade_status = match run_tool(&python, "pip", &["-m", "pip", "install", "--upgrade", "pip"])
    {
        Ok(()) => "upgraded",
        Err(_) => "kept",
    };
    packages.push(PackageStatus {
        name: "pip".to_string(),
        version: "latest".to_string(),
        status: upgrade_status.to_string(),
        attempts: 1,
    });

    let mut pins: Vec<&Pin> = CORE_PINS.iter().collect();
    if full {
        pins.extend(FULL_PINS.iter());
    }

    for pin in pins {
        let spec = format!("{}=={}", pin.name, pin.version);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match run_tool(&python, "pip", &["-m", "pip", "install", &spec]) {
                Ok(()) => {
                    packages.push(PackageStatus {
                        name: pin.name.to_string(),
                        version: pin.version.to_string(),
                        status: "installed".to_string(),
                        attempts: attempt,
                    });
                    break;
                }
                Err(_) if attempt < retries => {
                    std::thread::sleep(Duration::from_secs(attempt as u64));
                }
                Err(err) => return Err(err),
            }
        }
    }

    Ok(InstallReport {
        interpreter: python.display().to_string(),
        packages,
    })
}

/// The interpreter pip runs under: the STEWARD_PYTHON override when set,
/// else the install root's virtualenv, created on first use.
fn interpreter(root: &Path) -> Result<PathBuf, InstallError> {
    if let Ok(p) = std::env::var("STEWARD_PYTHON") {
        if !p.is_empty() {
            return Ok(PathBuf::from(p));
        }
    }
    let venv_python = storage::venv_python(root);
    if !venv_python.exists() {
        let host_python = probe::resolve_python();
        let venv = storage::venv_dir(root).display().to_string();
        run_tool(&host_python, "venv", &["-m", "venv", venv.as_str()])?;
    }
    Ok(venv_python)
}

fn run_tool(python: &Path, label: &str, args: &[&str]) -> Result<(), InstallError> {
    let output = Command::new(python)
        .args(args)
        .output()
        .map_err(|source| InstallError::Spawn {
            tool: python.display().to_string(),
            source,
        })?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let detail = if stderr.trim().is_empty() { stdout } else { stderr };
    Err(InstallError::ToolFailure {
        tool: label.to_string(),
        status: output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string()),
        output: tail(detail.trim(), 800),
    })
}

fn tail(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let start = text.len() - max;
    let start = text
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| i >= start)
        .unwrap_or(0);
    format!("...{}", &text[start..])
}
