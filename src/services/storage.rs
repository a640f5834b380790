use std::path::{Path, PathBuf};

pub fn config_path(root: &Path) -> PathBuf {
    root.join("config.yaml")
}

pub fn env_path(root: &Path) -> PathBuf {
    root.join(".env")
}

pub fn models_dir(root: &Path) -> PathBuf {
    root.join("data").join("models")
}

pub fn logs_dir(root: &Path) -> PathBuf {
    root.join("data").join("logs")
}

pub fn venv_dir(root: &Path) -> PathBuf {
    root.join(".venv")
}

pub fn venv_python(root: &Path) -> PathBuf {
    venv_dir(root).join("bin").join("python")
}

/// Append an audit event to `data/logs/audit.jsonl`. Best-effort: the
/// audit trail never fails a provisioning run.
pub fn audit(root: &Path, action: &str, data: serde_json::Value) {
    let path = logs_dir(root).join("audit.jsonl");
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let event = serde_json::json!({
        "ts": unix_now(),
        "action": action,
        "data": data
    });
    let line = format!("{}\n", event);
    let _ = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut f| std::io::Write::write_all(&mut f, line.as_bytes()));
}

fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
