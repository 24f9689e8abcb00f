//! boxdesk - headless session controller for remote container workspaces
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;

use boxdesk::headless::runner::{run_headless, ConnectionOverrides};
use boxdesk_app::config;

/// boxdesk - drive terminals, files and layout of a remote workspace
#[derive(Parser, Debug)]
#[command(name = "boxdesk")]
#[command(about = "Headless session controller for remote container workspaces", long_about = None)]
struct Args {
    /// Directory holding .boxdesk/config.toml
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Workspace server endpoint (ws:// or wss://)
    #[arg(long)]
    endpoint: Option<String>,

    /// Workspace/container key
    #[arg(long, short)]
    workspace: Option<String>,

    /// Write a default .boxdesk/config.toml and exit
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let base = args
        .dir
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    if args.init {
        let path = config::config_path(&base);
        if path.exists() {
            eprintln!("Config already exists: {}", path.display());
            return Ok(());
        }
        config::save_settings(&base, &config::Settings::default())?;
        eprintln!("Wrote {}", path.display());
        return Ok(());
    }

    boxdesk_core::logging::init()?;

    let overrides = ConnectionOverrides {
        endpoint: args.endpoint,
        workspace: args.workspace,
    };
    run_headless(&base, overrides).await?;
    Ok(())
}
