use crate::cli::Cli;
use crate::domain::models::{CheckItem, DeployReport, ProvisioningConfig};
use crate::error::BootstrapError;
use crate::services::output::print_one;
use crate::services::{health, materialize, registrar, storage};
use std::path::Path;

pub fn deploy(
    cli: &Cli,
    domain: Option<&str>,
    system_root: &Path,
    apply: bool,
    skip_health: bool,
) -> anyhow::Result<()> {
    let config = materialize::load_config(&cli.root).map_err(BootstrapError::from)?;
    let report = register(cli, &config, domain, system_root, apply, skip_health)?;
    print_one(cli.json, report, describe_deploy)
}

pub fn check(cli: &Cli) -> anyhow::Result<()> {
    let config = materialize::load_config(&cli.root).map_err(BootstrapError::from)?;
    let report =
        health::check(&config.server.host, config.server.port).map_err(BootstrapError::from)?;
    print_one(cli.json, report, |h| {
        format!("health ok: {} (status {})", h.url, h.status.unwrap_or(0))
    })
}

/// Render and install the service configuration, then verify the
/// service actually answers. Health failure is fatal: a registrar that
/// leaves the service unreachable must not report success.
pub fn register(
    cli: &Cli,
    config: &ProvisioningConfig,
    domain_flag: Option<&str>,
    system_root: &Path,
    apply: bool,
    skip_health: bool,
) -> anyhow::Result<DeployReport> {
    let domain = domain_flag
        .map(str::to_string)
        .or_else(|| config.deploy.as_ref().map(|d| d.domain.clone()))
        .unwrap_or_default();
    let user = config
        .deploy
        .as_ref()
        .map(|d| d.user.clone())
        .unwrap_or_else(|| "leona".to_string());

    registrar::check_value("domain", &domain).map_err(BootstrapError::from)?;
    registrar::check_value("user", &user).map_err(BootstrapError::from)?;

    let deploy_dir = std::fs::canonicalize(&cli.root).unwrap_or_else(|_| cli.root.clone());
    let inputs = registrar::DeployInputs {
        service: registrar::service_slug(&config.name),
        domain: domain.clone(),
        user,
        deploy_dir,
        host: config.server.host.clone(),
        port: config.server.port,
        workers: materialize::read_workers(&storage::env_path(&cli.root)),
    };

    let mut checks = registrar::write_artifacts(system_root, &inputs).map_err(BootstrapError::from)?;

    let certificate;
    if apply {
        let applied = registrar::apply(&inputs).map_err(BootstrapError::from)?;
        certificate = applied
            .iter()
            .find(|c| c.name == "certificate")
            .map(|c| c.status.clone())
            .unwrap_or_else(|| "ok".to_string());
        checks.extend(applied);
    } else if registrar::placeholder_domain(&inputs.domain) {
        certificate = "skipped (placeholder domain)".to_string();
        checks.push(CheckItem {
            name: "certificate".to_string(),
            status: certificate.clone(),
        });
    } else {
        certificate = "planned".to_string();
        checks.push(CheckItem {
            name: "certificate".to_string(),
            status: certificate.clone(),
        });
    }

    let health = if skip_health {
        None
    } else {
        Some(
            health::check(&config.server.host, config.server.port)
                .map_err(BootstrapError::from)?,
        )
    };

    storage::audit(
        &cli.root,
        "deploy",
        serde_json::json!({
            "service": inputs.service,
            "domain": inputs.domain,
            "applied": apply,
        }),
    );

    Ok(DeployReport {
        service: inputs.service,
        domain: inputs.domain,
        checks,
        firewall: registrar::firewall_plan(),
        certificate,
        health,
    })
}

pub fn describe_deploy(r: &DeployReport) -> String {
    let mut lines = vec![format!("deployed {} ({})", r.service, r.domain)];
    for c in &r.checks {
        lines.push(format!("  {}\t{}", c.name, c.status));
    }
    lines.push(format!("  firewall\t{}", r.firewall.join(", ")));
    match &r.health {
        Some(h) => lines.push(format!(
            "  health\tok ({} status {})",
            h.url,
            h.status.unwrap_or(0)
        )),
        None => lines.push("  health\tskipped".to_string()),
    }
    lines.join("\n")
}
