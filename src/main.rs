use std::time::Duration;

use clap::Parser;
use git_drift::git::{DEFAULT_COMMAND_TIMEOUT, SystemGit};
use git_drift::settings::{ConfigFile, FetchFailure, Settings};
use git_drift::{report, scan};

/// Scan a directory tree for git working copies that are dirty or out of
/// sync with their remotes.
#[derive(Parser)]
#[command(name = "git-drift", version, about)]
struct Cli {
    /// Root directory to scan (defaults to the configured root, then `.`)
    root: Option<String>,

    /// Skip the network refresh before computing divergence
    #[arg(long)]
    no_fetch: bool,

    /// What to do when a repository's fetch fails
    #[arg(long, value_enum)]
    fetch_failure: Option<FetchFailure>,

    /// Time limit for a single git invocation, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ConfigFile::load()?;

    let raw_root = cli
        .root
        .or(config.root)
        .unwrap_or_else(|| ".".to_string());
    let root = scan::resolve_root(&raw_root)?;

    let settings = Settings {
        root,
        fetch: !cli.no_fetch,
        fetch_failure: cli
            .fetch_failure
            .or(config.fetch_failure)
            .unwrap_or_default(),
        timeout: cli
            .timeout
            .or(config.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_COMMAND_TIMEOUT),
    };

    let runner = SystemGit::with_timeout(settings.timeout);
    report::run(&runner, &settings)
}
