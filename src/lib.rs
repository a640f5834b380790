//! Host provisioning for the Leona assistant stack.
//!
//! The bootstrap workflow is a linear pipeline of gates: probe the host,
//! materialize the layout and configuration, install the pinned
//! dependency set, fetch a model from the catalog, and (production only)
//! register the system services and health-check the result. Each stage
//! either fully succeeds or aborts the run with a stage-specific exit
//! code.

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod domain;
pub mod error;
pub mod services;

use cli::{Cli, Commands, ModelCommands};
use services::materialize::InitOptions;

pub fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Probe { production } => commands::provision::probe(cli, *production),
        Commands::Init {
            production,
            host,
            port,
            domain,
            deploy_user,
        } => {
            let opts = InitOptions {
                production: *production,
                host: host.clone(),
                port: *port,
                domain: domain.clone(),
                deploy_user: deploy_user.clone(),
            };
            commands::provision::init(cli, &opts)
        }
        Commands::Install { full, retries } => commands::provision::install(cli, *full, *retries),
        Commands::Model { command } => match command {
            ModelCommands::List => commands::model::list(cli),
            ModelCommands::Fetch { selector, force } => {
                commands::model::fetch(cli, selector.as_deref(), *force)
            }
        },
        Commands::Deploy {
            domain,
            system_root,
            apply,
            skip_health,
        } => commands::deploy::deploy(cli, domain.as_deref(), system_root, *apply, *skip_health),
        Commands::Check => commands::deploy::check(cli),
        Commands::Up {
            production,
            model,
            full,
            skip_deps,
            skip_model,
            domain,
            system_root,
            apply,
        } => {
            let opts = commands::provision::UpOptions {
                production: *production,
                model: model.as_deref(),
                full: *full,
                skip_deps: *skip_deps,
                skip_model: *skip_model,
                domain: domain.as_deref(),
                system_root,
                apply: *apply,
            };
            commands::provision::up(cli, &opts)
        }
    }
}
