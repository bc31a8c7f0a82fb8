//! `mcsm` command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use mcsm::lifecycle::{self, startup::logs_dir, StartupOptions};
use mcsm::observability::logging::write_fatal;

#[derive(Parser, Debug)]
#[command(name = "mcsm", version, about = "Minecraft server supervisor")]
struct Cli {
    /// Server root directory
    #[arg(long, default_value = "server_files")]
    root: PathBuf,

    /// Launcher profile (defaults to <root>/mcsm.toml when present)
    #[arg(long)]
    profile: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let root = cli.root.clone();

    let options = StartupOptions {
        root: cli.root,
        profile: cli.profile,
    };

    match lifecycle::run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            write_fatal(&logs_dir(&root), &format!("{err:?}"));
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
