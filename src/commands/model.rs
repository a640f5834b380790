use crate::catalog;
use crate::cli::Cli;
use crate::domain::models::{DownloadReport, ModelProfile};
use crate::error::{BootstrapError, SelectionError};
use crate::services::output::{fmt_bytes, print_one, print_out};
use crate::services::{fetch, materialize, storage};
use std::io::{BufRead, Write};

pub fn list(cli: &Cli) -> anyhow::Result<()> {
    let models = catalog::load(cli.catalog.as_deref()).map_err(BootstrapError::from)?;
    print_out(cli.json, &models, |m| {
        format!(
            "{}\t{}\t{}\t{}",
            m.id,
            m.name,
            fmt_bytes(m.size_bytes),
            m.filename
        )
    })
}

pub fn fetch(cli: &Cli, selector: Option<&str>, force: bool) -> anyhow::Result<()> {
    let models = catalog::load(cli.catalog.as_deref()).map_err(BootstrapError::from)?;
    let profile = resolve_profile(&models, selector)?;
    let report = run_fetch(cli, &profile, force)?;
    print_one(cli.json, report, describe_download)
}

/// Resolve the selection: explicit argument, then the STEWARD_MODEL
/// environment variable, then an interactive menu. Validation happens
/// before any network or filesystem side effect.
pub fn resolve_profile(
    models: &[ModelProfile],
    selector: Option<&str>,
) -> anyhow::Result<ModelProfile> {
    let env_choice = std::env::var("STEWARD_MODEL").ok().filter(|s| !s.is_empty());
    let raw = selector.map(str::to_string).or(env_choice);
    match raw {
        Some(raw) => {
            let profile = catalog::select(models, &raw)
                .map_err(BootstrapError::from)?
                .clone();
            Ok(profile)
        }
        None => prompt_selection(models),
    }
}

fn prompt_selection(models: &[ModelProfile]) -> anyhow::Result<ModelProfile> {
    eprintln!("available models:");
    for m in models {
        eprintln!("  {}. {} ({})", m.id, m.name, fmt_bytes(m.size_bytes));
    }
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    loop {
        eprint!("Select model (1-{}): ", models.len());
        std::io::stderr().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(BootstrapError::from(SelectionError::NoInput).into());
        }
        match catalog::select(models, &line) {
            Ok(profile) => return Ok(profile.clone()),
            Err(err) => eprintln!("{err}"),
        }
    }
}

/// Run the download with progress on stderr, then record the model path
/// in the config and the audit log.
pub fn run_fetch(
    cli: &Cli,
    profile: &ModelProfile,
    force: bool,
) -> anyhow::Result<DownloadReport> {
    let models_dir = storage::models_dir(&cli.root);
    if !cli.json {
        eprintln!(
            "fetching {} ({}) -> {}",
            profile.name,
            fmt_bytes(profile.size_bytes),
            models_dir.join(&profile.filename).display()
        );
    }

    let quiet = cli.json;
    let mut last_reported = 0u64;
    let report = fetch::fetch(profile, &models_dir, force, |written, total| {
        if quiet {
            return;
        }
        let step = 2 * 1024 * 1024;
        let done = total.map(|t| written >= t).unwrap_or(false);
        if written.saturating_sub(last_reported) < step && !done {
            return;
        }
        last_reported = written;
        match total {
            Some(total) if total > 0 => {
                let percent = written as f64 * 100.0 / total as f64;
                eprint!(
                    "\r  {:>5.1}% ({} / {})",
                    percent,
                    fmt_bytes(written),
                    fmt_bytes(total)
                );
            }
            _ => eprint!("\r  {} downloaded", fmt_bytes(written)),
        }
        let _ = std::io::stderr().flush();
    })
    .map_err(BootstrapError::from)?;
    if !cli.json {
        eprintln!();
    }

    if !report.already_present {
        let relative = format!("data/models/{}", report.filename);
        materialize::record_model_path(&cli.root, &relative).map_err(BootstrapError::from)?;
        storage::audit(
            &cli.root,
            "model_fetch",
            serde_json::json!({
                "model": report.model,
                "filename": report.filename,
                "bytes": report.bytes_written,
                "verified": report.verified,
            }),
        );
    }
    Ok(report)
}

pub fn describe_download(r: &DownloadReport) -> String {
    if r.already_present {
        format!(
            "{} already present at {} ({}); use --force to re-download",
            r.model,
            r.path,
            fmt_bytes(r.bytes_written)
        )
    } else if r.verified {
        format!(
            "downloaded {} to {} ({} bytes, sha256 verified)",
            r.model, r.path, r.bytes_written
        )
    } else {
        format!(
            "downloaded {} to {} ({} bytes, sha256 {})",
            r.model, r.path, r.bytes_written, r.sha256
        )
    }
}
