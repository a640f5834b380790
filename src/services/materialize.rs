use crate::domain::models::{DeploySettings, MaterializeReport, ProvisioningConfig};
use crate::error::MaterializeError;
use crate::services::storage;
use rand::RngCore;
use std::path::Path;

/// The fixed on-disk layout, created with create-if-absent semantics.
pub const LAYOUT: [&str; 8] = [
    "backend",
    "frontend",
    "data/memory",
    "data/models",
    "data/logs",
    "data/backups",
    "plugins",
    "scripts",
];

pub const DEFAULT_WORKERS: u32 = 4;

#[derive(Debug, Default)]
pub struct InitOptions {
    pub production: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub domain: Option<String>,
    pub deploy_user: Option<String>,
}

/// Create the layout and write the configuration artifacts. Safe to
/// re-run: existing directories are left alone, an existing config is
/// reloaded so only explicitly overridden fields change, and an existing
/// secret is preserved verbatim.
pub fn materialize(root: &Path, opts: &InitOptions) -> Result<MaterializeReport, MaterializeError> {
    let mut created_dirs = Vec::new();
    for dir in LAYOUT {
        let path = root.join(dir);
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
            created_dirs.push(dir.to_string());
        }
    }

    let config_path = storage::config_path(root);
    let mut config = if config_path.exists() {
        load_config(root)?
    } else {
        ProvisioningConfig::default()
    };
    if let Some(host) = &opts.host {
        config.server.host = host.clone();
    }
    if let Some(port) = opts.port {
        config.server.port = port;
    }
    if opts.domain.is_some() || opts.deploy_user.is_some() || opts.production {
        let deploy = config.deploy.get_or_insert_with(DeploySettings::default);
        if let Some(domain) = &opts.domain {
            deploy.domain = domain.clone();
        }
        if let Some(user) = &opts.deploy_user {
            deploy.user = user.clone();
        }
    }
    write_config(&config_path, &config)?;

    let mut env_path = None;
    let mut secret_preserved = false;
    if opts.production {
        let path = storage::env_path(root);
        let existing = read_secret(&path);
        secret_preserved = existing.is_some();
        let secret = existing.unwrap_or_else(generate_secret);
        write_private(&path, &render_env(&config, &secret))?;
        env_path = Some(path.display().to_string());
    }

    Ok(MaterializeReport {
        root: root.display().to_string(),
        created_dirs,
        config_path: config_path.display().to_string(),
        env_path,
        secret_preserved,
    })
}

pub fn load_config(root: &Path) -> Result<ProvisioningConfig, MaterializeError> {
    let path = storage::config_path(root);
    if !path.exists() {
        return Err(MaterializeError::MissingConfig(path));
    }
    let raw = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&raw).map_err(|source| MaterializeError::InvalidConfig { path, source })
}

fn write_config(path: &Path, config: &ProvisioningConfig) -> Result<(), MaterializeError> {
    let body = serde_yaml::to_string(config)
        .map_err(|source| MaterializeError::InvalidConfig {
            path: path.to_path_buf(),
            source,
        })?;
    std::fs::write(path, body)?;
    Ok(())
}

/// 32 bytes from the OS entropy source, hex-encoded.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Pull an existing SECRET_KEY out of an env file, if one is on disk.
/// Re-provisioning must never rotate a secret that services already use.
pub fn read_secret(path: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    for line in raw.lines() {
        if let Some(value) = line.strip_prefix("SECRET_KEY=") {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Worker count the supervisor unit should run, as written to the env
/// file; falls back to the default when no env file exists.
pub fn read_workers(path: &Path) -> u32 {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return DEFAULT_WORKERS;
    };
    raw.lines()
        .find_map(|line| line.strip_prefix("WORKERS="))
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_WORKERS)
}

pub fn render_env(config: &ProvisioningConfig, secret: &str) -> String {
    let user = config
        .deploy
        .as_ref()
        .map(|d| d.user.as_str())
        .unwrap_or("leona");
    format!(
        "ENV=production\n\
         HOST={host}\n\
         PORT={port}\n\
         DATABASE_URL=postgresql://{user}@127.0.0.1/leona\n\
         REDIS_URL=redis://127.0.0.1:6379/0\n\
         SECRET_KEY={secret}\n\
         MODEL_PATH={model_path}\n\
         LOG_LEVEL=info\n\
         WORKERS={workers}\n",
        host = config.server.host,
        port = config.server.port,
        user = user,
        secret = secret,
        model_path = config.llm.model_path,
        workers = DEFAULT_WORKERS,
    )
}

/// Write a file that holds secrets with owner-only permissions.
fn write_private(path: &Path, body: &str) -> Result<(), MaterializeError> {
    std::fs::write(path, body)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

/// Point the config at a fetched model file. No-op when the root has not
/// been materialized yet.
pub fn record_model_path(root: &Path, relative: &str) -> Result<(), MaterializeError> {
    let path = storage::config_path(root);
    if !path.exists() {
        return Ok(());
    }
    let mut config = load_config(root)?;
    if config.llm.model_path != relative {
        config.llm.model_path = relative.to_string();
        write_config(&path, &config)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{generate_secret, read_secret, read_workers, render_env, DEFAULT_WORKERS};
    use crate::domain::models::ProvisioningConfig;

    #[test]
    fn secrets_are_32_bytes_hex() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn env_rendering_is_stable_and_complete() {
        let config = ProvisioningConfig::default();
        let body = render_env(&config, "deadbeef");
        for key in [
            "ENV=", "HOST=", "PORT=", "DATABASE_URL=", "REDIS_URL=", "SECRET_KEY=", "MODEL_PATH=",
            "LOG_LEVEL=", "WORKERS=",
        ] {
            assert!(body.contains(key), "missing {key}");
        }
        assert_eq!(body, render_env(&config, "deadbeef"));
        assert!(body.contains("SECRET_KEY=deadbeef\n"));
    }

    #[test]
    fn existing_secret_is_found_in_env_file() {
        let dir = std::env::temp_dir().join(format!("steward-secret-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(".env");
        std::fs::write(&path, "ENV=production\nSECRET_KEY=cafe01\nPORT=8000\n").unwrap();
        assert_eq!(read_secret(&path), Some("cafe01".to_string()));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_env_file_yields_no_secret() {
        assert_eq!(read_secret(std::path::Path::new("/nonexistent/.env")), None);
    }

    #[test]
    fn worker_count_comes_from_env_file_when_present() {
        let dir = std::env::temp_dir().join(format!("steward-workers-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(".env");
        std::fs::write(&path, "ENV=production\nWORKERS=8\n").unwrap();
        assert_eq!(read_workers(&path), 8);
        std::fs::write(&path, "ENV=production\nWORKERS=eight\n").unwrap();
        assert_eq!(read_workers(&path), DEFAULT_WORKERS);
        assert_eq!(
            read_workers(std::path::Path::new("/nonexistent/.env")),
            DEFAULT_WORKERS
        );
        std::fs::remove_dir_all(&dir).ok();
    }
}
