use crate::domain::models::CheckItem;
use crate::error::DeployError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Everything the render step needs, already validated. Values are
/// substituted into nginx/supervisor text, so they must never carry
/// shell or config metacharacters.
#[derive(Debug, Clone)]
pub struct DeployInputs {
    pub service: String,
    pub domain: String,
    pub user: String,
    pub deploy_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub workers: u32,
}

const UNSAFE_CHARS: &str = "\"'`$;\\{}<>&|";

pub fn check_value(field: &'static str, value: &str) -> Result<(), DeployError> {
    if value
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || UNSAFE_CHARS.contains(c))
    {
        return Err(DeployError::UnsafeValue {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Lowercased identifier used for config filenames and the supervisor
/// program name.
pub fn service_slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .filter_map(|c| match c {
            'A'..='Z' => Some(c.to_ascii_lowercase()),
            'a'..='z' | '0'..='9' | '-' => Some(c),
            ' ' | '_' => Some('-'),
            _ => None,
        })
        .collect();
    if slug.is_empty() {
        "leona".to_string()
    } else {
        slug
    }
}

/// The reverse-proxy config: the WebSocket path is long-lived and gets
/// an extended idle timeout, plain requests time out quickly, and
/// static assets are cached aggressively.
pub fn render_nginx(inputs: &DeployInputs) -> String {
    format!(
        r#"server {{
    listen 80;
    server_name {domain};

    location /ws {{
        proxy_pass http://{host}:{port};
        proxy_http_version 1.1;
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection "upgrade";
        proxy_set_header Host $host;
        proxy_read_timeout 86400s;
    }}

    location /static/ {{
        alias {deploy_dir}/frontend/static/;
        expires 30d;
        add_header Cache-Control "public, immutable";
    }}

    location / {{
        proxy_pass http://{host}:{port};
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_read_timeout 60s;
        proxy_send_timeout 60s;
    }}
}}
"#,
        domain = inputs.domain,
        host = inputs.host,
        port = inputs.port,
        deploy_dir = inputs.deploy_dir.display(),
    )
}

/// The process-supervision unit: crash restarts and a bounded worker
/// pool.
pub fn render_supervisor(inputs: &DeployInputs) -> String {
    format!(
        r#"[program:{service}]
command={deploy_dir}/.venv/bin/uvicorn backend.main:app --host {host} --port {port} --workers {workers}
directory={deploy_dir}
user={user}
autostart=true
autorestart=true
startretries=3
stopasgroup=true
stdout_logfile={deploy_dir}/data/logs/{service}.out.log
stderr_logfile={deploy_dir}/data/logs/{service}.err.log
environment=PYTHONUNBUFFERED="1"
"#,
        service = inputs.service,
        deploy_dir = inputs.deploy_dir.display(),
        host = inputs.host,
        port = inputs.port,
        workers = inputs.workers,
        user = inputs.user,
    )
}

/// Default-deny inbound with an explicit allow list; applied via ufw
/// only in apply mode, always reported.
pub fn firewall_plan() -> Vec<String> {
    vec![
        "default deny incoming".to_string(),
        "default allow outgoing".to_string(),
        "allow OpenSSH".to_string(),
        "allow 80/tcp".to_string(),
        "allow 443/tcp".to_string(),
    ]
}

/// Domains that cannot receive an ACME challenge; certificate issuance
/// is skipped for these.
pub fn placeholder_domain(domain: &str) -> bool {
    let d = domain.trim().to_ascii_lowercase();
    d.is_empty()
        || d == "localhost"
        || d == "example.com"
        || d.ends_with(".example.com")
        || d.ends_with(".local")
        || d.starts_with("your-domain")
        || d.contains("your-domain.")
}

/// Write the rendered nginx and supervisor config under `system_root`,
/// enabling the site with a symlink. Existing artifacts are overwritten
/// (they are generated), the enable link is created only if absent.
pub fn write_artifacts(
    system_root: &Path,
    inputs: &DeployInputs,
) -> Result<Vec<CheckItem>, DeployError> {
    let mut checks = Vec::new();

    let available = system_root
        .join("etc/nginx/sites-available")
        .join(format!("{}.conf", inputs.service));
    write_with_parents(&available, &render_nginx(inputs))?;
    checks.push(CheckItem {
        name: "nginx-config".to_string(),
        status: "written".to_string(),
    });

    let enabled_dir = system_root.join("etc/nginx/sites-enabled");
    std::fs::create_dir_all(&enabled_dir)?;
    let enabled = enabled_dir.join(format!("{}.conf", inputs.service));
    let link_status = if enabled.exists() {
        "exists"
    } else {
        #[cfg(unix)]
        std::os::unix::fs::symlink(&available, &enabled)?;
        #[cfg(not(unix))]
        std::fs::copy(&available, &enabled)?;
        "linked"
    };
    checks.push(CheckItem {
        name: "nginx-enabled".to_string(),
        status: link_status.to_string(),
    });

    let supervisor = system_root
        .join("etc/supervisor/conf.d")
        .join(format!("{}.conf", inputs.service));
    write_with_parents(&supervisor, &render_supervisor(inputs))?;
    checks.push(CheckItem {
        name: "supervisor-config".to_string(),
        status: "written".to_string(),
    });

    Ok(checks)
}

/// Reload the system services and register firewall/certificate state.
/// Only called in apply mode; any tool failure is fatal to the run.
pub fn apply(inputs: &DeployInputs) -> Result<Vec<CheckItem>, DeployError> {
    let mut checks = Vec::new();

    run_tool("nginx", &["-t"])?;
    run_tool("systemctl", &["reload", "nginx"])?;
    checks.push(CheckItem {
        name: "nginx-reload".to_string(),
        status: "ok".to_string(),
    });

    run_tool("supervisorctl", &["reread"])?;
    run_tool("supervisorctl", &["update"])?;
    checks.push(CheckItem {
        name: "supervisor-update".to_string(),
        status: "ok".to_string(),
    });

    run_tool("ufw", &["default", "deny", "incoming"])?;
    run_tool("ufw", &["default", "allow", "outgoing"])?;
    run_tool("ufw", &["allow", "OpenSSH"])?;
    run_tool("ufw", &["allow", "80/tcp"])?;
    run_tool("ufw", &["allow", "443/tcp"])?;
    run_tool("ufw", &["--force", "enable"])?;
    checks.push(CheckItem {
        name: "firewall".to_string(),
        status: "ok".to_string(),
    });

    if placeholder_domain(&inputs.domain) {
        checks.push(CheckItem {
            name: "certificate".to_string(),
            status: "skipped (placeholder domain)".to_string(),
        });
    } else {
        let email = format!("admin@{}", inputs.domain);
        run_tool(
            "certbot",
            &[
                "--nginx",
                "-d",
                &inputs.domain,
                "--non-interactive",
                "--agree-tos",
                "-m",
                &email,
            ],
        )?;
        checks.push(CheckItem {
            name: "certificate".to_string(),
            status: "ok".to_string(),
        });
    }

    Ok(checks)
}

fn write_with_parents(path: &Path, body: &str) -> Result<(), DeployError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body)?;
    Ok(())
}

fn run_tool(tool: &str, args: &[&str]) -> Result<(), DeployError> {
    let output = Command::new(tool)
        .args(args)
        .output()
        .map_err(|source| DeployError::Spawn {
            tool: tool.to_string(),
            source,
        })?;
    if !output.status.success() {
        return Err(DeployError::CommandFailed {
            tool: tool.to_string(),
            status: output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        check_value, firewall_plan, placeholder_domain, render_nginx, render_supervisor,
        service_slug, DeployInputs,
    };
    use std::path::PathBuf;

    fn inputs() -> DeployInputs {
        DeployInputs {
            service: "leona".to_string(),
            domain: "assistant.example.org".to_string(),
            user: "leona".to_string(),
            deploy_dir: PathBuf::from("/opt/leona"),
            host: "127.0.0.1".to_string(),
            port: 8000,
            workers: 4,
        }
    }

    #[test]
    fn nginx_separates_websocket_from_plain_traffic() {
        let conf = render_nginx(&inputs());
        assert!(conf.contains("location /ws"));
        assert!(conf.contains("proxy_read_timeout 86400s"));
        assert!(conf.contains("proxy_read_timeout 60s"));
        assert!(conf.contains("Upgrade $http_upgrade"));
    }

    #[test]
    fn nginx_caches_static_assets() {
        let conf = render_nginx(&inputs());
        assert!(conf.contains("location /static/"));
        assert!(conf.contains("expires 30d"));
        assert!(conf.contains("Cache-Control \"public, immutable\""));
    }

    #[test]
    fn supervisor_restarts_with_bounded_workers() {
        let conf = render_supervisor(&inputs());
        assert!(conf.contains("autorestart=true"));
        assert!(conf.contains("--workers 4"));
        assert!(conf.contains("[program:leona]"));
        assert!(conf.contains("user=leona"));
    }

    #[test]
    fn firewall_defaults_to_deny_inbound() {
        let plan = firewall_plan();
        assert_eq!(plan[0], "default deny incoming");
        assert!(plan.iter().any(|r| r == "allow OpenSSH"));
        assert!(plan.iter().any(|r| r == "allow 443/tcp"));
    }

    #[test]
    fn placeholder_domains_skip_certificates() {
        for d in ["", "localhost", "example.com", "box.local", "your-domain.com"] {
            assert!(placeholder_domain(d), "{d:?} should be a placeholder");
        }
        assert!(!placeholder_domain("assistant.example.org"));
    }

    #[test]
    fn metacharacters_are_rejected_before_rendering() {
        assert!(check_value("domain", "ok.example.org").is_ok());
        for bad in ["a b", "x;rm", "d\"q", "tick`", "dollar$var"] {
            assert!(check_value("domain", bad).is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn slugs_are_filename_safe() {
        assert_eq!(service_slug("LEONA"), "leona");
        assert_eq!(service_slug("My Assistant_2"), "my-assistant-2");
        assert_eq!(service_slug("!!!"), "leona");
    }
}
