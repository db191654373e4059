use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::*;
use log::{debug, error};

use readmesmith::{error::Result, logging, Config, ReadmeService};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Public repository URL to generate a README for
    url: String,

    /// Print the extracted repository context instead of calling the model
    #[arg(long)]
    context_only: bool,

    /// Default log level (error, warn, info, debug, trace, off)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_level) {
        eprintln!("{} {}", "[WARNING]".yellow(), e);
    }

    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("{} {}", "Error:".red().bold(), e.public_message());
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    config.validate()?;
    debug!("Using model {}", config.gemini.model);

    let service = ReadmeService::from_config(config)?;
    if cli.context_only {
        let context = service.context_for(&cli.url).await?;
        print!("{}", context);
    } else {
        let readme = service.generate(&cli.url).await?;
        print!("{}", readme);
    }
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let mut config = Config::load_from(path)?;
            config.apply_env_overrides();
            Ok(config)
        }
        None => Config::load(),
    }
}
