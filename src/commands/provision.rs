use crate::cli::Cli;
use crate::commands::{deploy, model};
use crate::domain::models::{CheckItem, UpReport};
use crate::error::BootstrapError;
use crate::services::materialize::InitOptions;
use crate::services::output::print_one;
use crate::services::{installer, materialize, probe, storage};
use std::path::Path;

pub fn probe(cli: &Cli, production: bool) -> anyhow::Result<()> {
    let target = probe::probe(&cli.root, production).map_err(BootstrapError::from)?;
    print_one(cli.json, target, |t| {
        format!(
            "probe ok: python {} at {}, os {}, privileged={}, pip={}, existing_install={}",
            t.python_version, t.python, t.os, t.privileged, t.pip_available, t.existing_install
        )
    })
}

pub fn init(cli: &Cli, opts: &InitOptions) -> anyhow::Result<()> {
    let report = materialize::materialize(&cli.root, opts).map_err(BootstrapError::from)?;
    storage::audit(
        &cli.root,
        "init",
        serde_json::json!({
            "created_dirs": report.created_dirs,
            "production": opts.production,
            "secret_preserved": report.secret_preserved,
        }),
    );
    print_one(cli.json, report, describe_init)
}

pub fn install(cli: &Cli, full: bool, retries: u32) -> anyhow::Result<()> {
    let report = installer::install(&cli.root, full, retries).map_err(BootstrapError::from)?;
    storage::audit(
        &cli.root,
        "install",
        serde_json::json!({
            "interpreter": report.interpreter,
            "packages": report.packages.len(),
        }),
    );
    print_one(cli.json, report, describe_install)
}

pub struct UpOptions<'a> {
    pub production: bool,
    pub model: Option<&'a str>,
    pub full: bool,
    pub skip_deps: bool,
    pub skip_model: bool,
    pub domain: Option<&'a str>,
    pub system_root: &'a Path,
    pub apply: bool,
}

/// The composed pipeline. Stages run in order and a failure aborts the
/// remainder, with one exception: a model download failure is recorded,
/// the remaining stages still run, and the run exits with the download
/// error so the operator can retry that step independently.
pub fn up(cli: &Cli, opts: &UpOptions) -> anyhow::Result<()> {
    let mut stages = Vec::new();
    let mut stage = |name: &str, status: String| {
        if !cli.json {
            println!("{name}: {status}");
        }
        stages.push(CheckItem {
            name: name.to_string(),
            status,
        });
    };

    let target = probe::probe(&cli.root, opts.production).map_err(BootstrapError::from)?;
    stage(
        "probe",
        format!("ok, python {} ({})", target.python_version, target.python),
    );

    let init_opts = InitOptions {
        production: opts.production,
        host: None,
        port: None,
        domain: opts.domain.map(str::to_string),
        deploy_user: None,
    };
    let report = materialize::materialize(&cli.root, &init_opts).map_err(BootstrapError::from)?;
    storage::audit(
        &cli.root,
        "init",
        serde_json::json!({
            "created_dirs": report.created_dirs,
            "production": opts.production,
            "secret_preserved": report.secret_preserved,
        }),
    );
    stage("init", describe_init(&report));

    if opts.skip_deps {
        stage("install", "skipped".to_string());
    } else {
        let report =
            installer::install(&cli.root, opts.full, 3).map_err(BootstrapError::from)?;
        storage::audit(
            &cli.root,
            "install",
            serde_json::json!({
                "interpreter": report.interpreter,
                "packages": report.packages.len(),
            }),
        );
        stage("install", describe_install(&report));
    }

    let mut model_failure: Option<anyhow::Error> = None;
    if opts.skip_model {
        stage("model", "skipped".to_string());
    } else {
        let models =
            crate::catalog::load(cli.catalog.as_deref()).map_err(BootstrapError::from)?;
        let profile = model::resolve_profile(&models, opts.model)?;
        match model::run_fetch(cli, &profile, false) {
            Ok(report) => stage("model", model::describe_download(&report)),
            Err(err) => {
                eprintln!(
                    "model download did not complete: {err:#}; continuing with the remaining stages"
                );
                eprintln!(
                    "  retry independently with: steward model fetch {}",
                    profile.id
                );
                stage("model", "failed (see above)".to_string());
                model_failure = Some(err);
            }
        }
    }

    if opts.production {
        let config = materialize::load_config(&cli.root).map_err(BootstrapError::from)?;
        let report = deploy::register(
            cli,
            &config,
            opts.domain,
            opts.system_root,
            opts.apply,
            false,
        )?;
        stage("deploy", deploy::describe_deploy(&report));
    }

    if let Some(err) = model_failure {
        return Err(err);
    }
    print_one(cli.json, UpReport { stages }, |_| {
        "provisioning complete".to_string()
    })
}

fn describe_init(r: &crate::domain::models::MaterializeReport) -> String {
    let mut line = if r.created_dirs.is_empty() {
        format!("layout up to date at {}", r.root)
    } else {
        format!("created {} directories under {}", r.created_dirs.len(), r.root)
    };
    line.push_str(&format!("; wrote {}", r.config_path));
    if let Some(env) = &r.env_path {
        if r.secret_preserved {
            line.push_str(&format!("; refreshed {env} (secret preserved)"));
        } else {
            line.push_str(&format!("; wrote {env} (new secret)"));
        }
    }
    line
}

fn describe_install(r: &crate::domain::models::InstallReport) -> String {
    let installed = r
        .packages
        .iter()
        .filter(|p| p.status == "installed")
        .count();
    format!(
        "installed {} pinned packages with {}",
        installed, r.interpreter
    )
}
