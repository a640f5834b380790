use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "steward", version, about = "Host provisioning CLI for the Leona assistant stack")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Install root directory"
    )]
    pub root: PathBuf,
    #[arg(
        long,
        global = true,
        help = "Model catalog file (JSON); defaults to the built-in catalog"
    )]
    pub catalog: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect the host without changing anything
    Probe {
        #[arg(long, help = "Also require production prerequisites (root)")]
        production: bool,
    },
    /// Create the directory layout and configuration artifacts
    Init {
        #[arg(long, help = "Also write the production .env file")]
        production: bool,
        #[arg(long, help = "Server bind host")]
        host: Option<String>,
        #[arg(long, help = "Server port")]
        port: Option<u16>,
        #[arg(long, help = "Public domain for the production deployment")]
        domain: Option<String>,
        #[arg(long, help = "System user the service runs as")]
        deploy_user: Option<String>,
    },
    /// Install the pinned Python dependency set into the virtualenv
    Install {
        #[arg(long, help = "Install the full (voice + inference) pin set")]
        full: bool,
        #[arg(long, default_value_t = 3, help = "Attempts per package")]
        retries: u32,
    },
    /// Model catalog operations
    Model {
        #[command(subcommand)]
        command: ModelCommands,
    },
    /// Render and install service configuration, then health-check
    Deploy {
        #[arg(long, help = "Public domain (overrides config)")]
        domain: Option<String>,
        #[arg(long, default_value = "/", help = "Prefix for system config paths")]
        system_root: PathBuf,
        #[arg(long, help = "Run nginx/supervisor/ufw/certbot instead of only rendering")]
        apply: bool,
        #[arg(long, help = "Skip the post-deploy health check")]
        skip_health: bool,
    },
    /// Health-check the configured status endpoint
    Check,
    /// Run the whole pipeline: probe, init, install, fetch, deploy
    Up {
        #[arg(long, help = "Production path: requires root, writes .env, deploys services")]
        production: bool,
        #[arg(long, help = "Model selector (1-N); defaults to STEWARD_MODEL or an interactive menu")]
        model: Option<String>,
        #[arg(long, help = "Install the full (voice + inference) pin set")]
        full: bool,
        #[arg(long, help = "Skip the dependency install stage")]
        skip_deps: bool,
        #[arg(long, help = "Skip the model download stage")]
        skip_model: bool,
        #[arg(long, help = "Public domain for the production deployment")]
        domain: Option<String>,
        #[arg(long, default_value = "/", help = "Prefix for system config paths")]
        system_root: PathBuf,
        #[arg(long, help = "Run nginx/supervisor/ufw/certbot instead of only rendering")]
        apply: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModelCommands {
    /// List the catalog
    List,
    /// Download a model by catalog ordinal
    Fetch {
        #[arg(help = "Catalog ordinal (1-N); falls back to STEWARD_MODEL, then an interactive menu")]
        selector: Option<String>,
        #[arg(long, help = "Re-download even if the file already exists")]
        force: bool,
    },
}
