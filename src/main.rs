use clap::Parser;
use steward::cli::Cli;
use steward::error::BootstrapError;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = steward::run(&cli) {
        match err.chain().find_map(|c| c.downcast_ref::<BootstrapError>()) {
            Some(stage) => {
                eprintln!("error: {} stage failed", stage.stage());
                eprintln!("  cause: {stage}");
                let mut source = std::error::Error::source(stage);
                while let Some(inner) = source {
                    eprintln!("  cause: {inner}");
                    source = inner.source();
                }
                eprintln!("  next: {}", stage.hint());
                std::process::exit(stage.exit_code());
            }
            None => {
                eprintln!("error: {err:#}");
                std::process::exit(1);
            }
        }
    }
}
